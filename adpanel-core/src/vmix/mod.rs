// Module: vmix
// Everything that talks to, or interprets, the remote vMix instance.

pub mod client;
pub mod dispatch;
pub mod poller;
pub mod state;

pub use client::{is_valid_host, VmixClient, VmixTarget};
pub use dispatch::{DispatchOptions, Dispatcher, SendReport};
pub use poller::{StateReceiver, StatusPoller};
pub use state::{PlaybackState, PlaylistView, PlaylistViewItem, VmixInput, VmixState};
