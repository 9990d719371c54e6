//! vMix status document parsing
//!
//! The Web Controller reports state as an XML tree: `<input>` elements
//! with `title`/`key`/`number`/`type`/`state`/`selectedIndex` attributes,
//! nested `<list><item>` entries holding file paths, and a top-level
//! `<active>` element naming the on-air input number. This is a plain
//! read-only tree walk.

use roxmltree::Document;
use serde::Serialize;

use crate::{Error, Result};

/// Playback state of a list input, from its `state` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    Paused,
    Other(String),
}

impl PlaybackState {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "paused" => Self::Paused,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Running => "Playing",
            Self::Paused => "Paused",
            Self::Other(raw) => raw,
        }
    }
}

/// One entry of a list input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub path: String,
    /// Explicit `selected="true"` attribute on the item.
    pub selected: bool,
}

/// One `<input>` element.
#[derive(Debug, Clone)]
pub struct VmixInput {
    pub title: String,
    pub key: String,
    pub number: String,
    pub kind: String,
    pub state: PlaybackState,
    /// 1-based selected position reported on the input itself.
    pub selected_index: Option<u32>,
    pub items: Vec<PlaylistItem>,
}

impl VmixInput {
    /// Whether the 0-based item index is the selected one according to the
    /// input's 1-based `selectedIndex`.
    #[must_use]
    pub fn index_selected(&self, index: usize) -> bool {
        self.selected_index
            .is_some_and(|sel| sel > 0 && index + 1 == sel as usize)
    }
}

/// Parsed status document.
#[derive(Debug, Clone)]
pub struct VmixState {
    pub inputs: Vec<VmixInput>,
    /// Number of the input currently in program.
    pub active_input: Option<String>,
}

impl VmixState {
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| Error::UnexpectedResponse(format!("invalid status document: {e}")))?;
        let root = doc.root_element();
        if root.tag_name().name() != "vmix" {
            return Err(Error::UnexpectedResponse(
                "status document has no <vmix> root".to_string(),
            ));
        }

        let mut inputs = Vec::new();
        for node in root.descendants().filter(|n| n.has_tag_name("input")) {
            let items = node
                .descendants()
                .filter(|n| n.has_tag_name("item"))
                .map(|n| PlaylistItem {
                    path: n.text().unwrap_or("").trim().to_string(),
                    selected: n.attribute("selected") == Some("true"),
                })
                .collect();

            inputs.push(VmixInput {
                title: node.attribute("title").unwrap_or("").to_string(),
                key: node.attribute("key").unwrap_or("").to_string(),
                number: node.attribute("number").unwrap_or("").to_string(),
                kind: node.attribute("type").unwrap_or("").to_string(),
                state: PlaybackState::parse(node.attribute("state").unwrap_or("Unknown")),
                selected_index: node
                    .attribute("selectedIndex")
                    .and_then(|s| s.parse().ok()),
                items,
            });
        }

        let active_input = root
            .children()
            .find(|n| n.has_tag_name("active"))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Self {
            inputs,
            active_input,
        })
    }

    /// Locate an input by operator query: case-insensitive exact title,
    /// exact key, exact number, then case-insensitive title substring.
    #[must_use]
    pub fn find_input(&self, query: &str) -> Option<&VmixInput> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();

        self.inputs
            .iter()
            .find(|i| i.title.to_lowercase() == needle)
            .or_else(|| self.inputs.iter().find(|i| i.key == query))
            .or_else(|| self.inputs.iter().find(|i| i.number == query))
            .or_else(|| {
                self.inputs
                    .iter()
                    .find(|i| i.title.to_lowercase().contains(&needle))
            })
    }

    /// Operator view of the playlist input matching `query`.
    #[must_use]
    pub fn playlist_view(&self, query: &str) -> Option<PlaylistView> {
        let input = self.find_input(query)?;
        let in_program = !input.number.is_empty()
            && self.active_input.as_deref() == Some(input.number.as_str());

        let items = input
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| PlaylistViewItem {
                position: index + 1,
                name: display_name(&item.path),
                selected: item.selected || input.index_selected(index),
            })
            .collect();

        Some(PlaylistView {
            input_title: input.title.clone(),
            input_number: input.number.clone(),
            state: input.state.label().to_string(),
            in_program,
            items,
        })
    }

    /// Titles of every input, for "not found" diagnostics.
    #[must_use]
    pub fn input_titles(&self) -> Vec<String> {
        self.inputs
            .iter()
            .map(|i| format!("{}: {}", i.number, i.title))
            .collect()
    }
}

/// Operator-facing view of one list input.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    pub input_title: String,
    pub input_number: String,
    pub state: String,
    pub in_program: bool,
    pub items: Vec<PlaylistViewItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistViewItem {
    /// 1-based playlist position.
    pub position: usize,
    pub name: String,
    pub selected: bool,
}

/// Base name of a playlist item path. vMix reports Windows paths, but
/// forward slashes show up too.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Base name with the playlist extension stripped.
#[must_use]
pub fn display_name(path: &str) -> String {
    let name = file_name(path);
    let cut = name.len().wrapping_sub(4);
    if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".mp4") {
        name[..cut].to_string()
    } else {
        name.to_string()
    }
}
