//! Weighted playlist generation
//!
//! Builds a randomized ad sequence from the clip library: each clip enters
//! a flat pool `priority` times, and consecutive slots avoid clips from the
//! same ad group (versioned variants of one base name) whenever more than
//! one group exists. When the filtered pool comes up empty the draw falls
//! back to the full pool, so the output is always exactly `count` long.
//!
//! The generator looks exactly one slot back. There is no global
//! anti-repetition window and no attempt to balance group distribution
//! beyond the weighting itself.

use std::collections::HashSet;

use rand::Rng;

use crate::models::Clip;

/// Seconds each playlist slot occupies.
pub const SLOT_SECONDS: u64 = 30;

const PLAYLIST_EXTENSION: &str = ".mp4";

/// Number of playlist slots a target duration buys.
#[must_use]
pub const fn slot_count(duration_seconds: u64) -> usize {
    (duration_seconds / SLOT_SECONDS) as usize
}

/// Group key for a clip filename: playlist extension stripped, trailing
/// `-N`/`_N` version suffix stripped, lower-cased.
///
/// `"Commercial-2.mp4"` and `"Commercial-1.mp4"` both map to
/// `"commercial"`; `"Promo.mp4"` maps to `"promo"`.
#[must_use]
pub fn ad_group_key(filename: &str) -> String {
    let stem = strip_extension(filename);
    let digits = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let base = if digits.len() < stem.len() && (digits.ends_with('-') || digits.ends_with('_')) {
        &digits[..digits.len() - 1]
    } else {
        stem
    };
    base.to_lowercase()
}

fn strip_extension(filename: &str) -> &str {
    let cut = filename.len().wrapping_sub(PLAYLIST_EXTENSION.len());
    if filename.is_char_boundary(cut) && filename[cut..].eq_ignore_ascii_case(PLAYLIST_EXTENSION) {
        &filename[..cut]
    } else {
        filename
    }
}

/// Whether two clips count as "the same ad" for adjacency purposes: the
/// exact same file (case-insensitive) or two variants sharing a group key.
/// Absent arguments never match anything.
#[must_use]
pub fn is_same_ad_group(a: Option<&Clip>, b: Option<&Clip>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    if a.filename.eq_ignore_ascii_case(&b.filename) {
        return true;
    }
    ad_group_key(&a.filename) == ad_group_key(&b.filename)
}

/// Draw `count` clips from the library, weighted by priority, avoiding
/// back-to-back picks from the same ad group when the library has more
/// than one group.
///
/// Never fails and never returns fewer than `count` items for a non-empty
/// library: an empty filtered pool falls back to the unfiltered pool, which
/// in pathological single-group libraries can produce runs of repeats.
#[must_use]
pub fn generate_weighted_selection<'a>(clips: &'a [Clip], count: usize) -> Vec<&'a Clip> {
    if clips.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut pool: Vec<&Clip> = Vec::new();
    for clip in clips {
        for _ in 0..clip.priority.weight() {
            pool.push(clip);
        }
    }

    let groups: HashSet<String> = clips.iter().map(|c| ad_group_key(&c.filename)).collect();
    let can_avoid_back_to_back = groups.len() > 1;

    let mut rng = rand::rng();
    let mut selected: Vec<&Clip> = Vec::with_capacity(count);

    for _ in 0..count {
        let last = selected.last().copied();
        let pick = if last.is_none() || !can_avoid_back_to_back {
            pool[rng.random_range(0..pool.len())]
        } else {
            let filtered: Vec<&Clip> = pool
                .iter()
                .copied()
                .filter(|&candidate| !is_same_ad_group(Some(candidate), last))
                .collect();
            if filtered.is_empty() {
                // Surviving variety is exhausted; an unconstrained draw
                // beats an unfilled slot.
                pool[rng.random_range(0..pool.len())]
            } else {
                filtered[rng.random_range(0..filtered.len())]
            }
        };
        selected.push(pick);
    }

    selected
}
