pub mod library;
pub mod settings;

pub use library::{BulkOutcome, LibraryService};
pub use settings::SettingsService;
