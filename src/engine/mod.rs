// engine module — fetch coordination and identity watching

mod coordinator;
mod watcher;

pub use coordinator::{FetchCoordinator, FetchError, FetchOutcome, FetchRecord};
pub use watcher::{Event, IdentityWatcher, WatcherHandle};
