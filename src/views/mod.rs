pub mod cycle;
pub mod layout;
pub mod state;
pub mod transfer;

pub use cycle::{CycleView, Screen, SyncOutcome};
pub use layout::LayoutRenderer;
pub use state::ViewState;
pub use transfer::TransferWorkflow;
