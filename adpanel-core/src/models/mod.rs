pub mod clip;
pub mod settings;

pub use clip::{Clip, ClipId, Priority};
pub use settings::{normalize_folder, ConnectionSettings, DEFAULT_VMIX_PORT};
