use crate::types::CycleStatus;

/// Open/close state of the "transfer unfinished issues" modal.
///
/// The transfer itself belongs to the transfer workflow; this only gates the
/// affordance on cycle status and tracks whether the modal is open.
#[derive(Debug, Default)]
pub struct TransferWorkflow {
    modal_open: bool,
}

impl TransferWorkflow {
    /// The affordance is offered for completed cycles only.
    pub fn affordance_visible(status: &CycleStatus) -> bool {
        status.is_completed()
    }

    /// Open the modal through the affordance. Returns whether it opened.
    pub fn open(&mut self, status: &CycleStatus) -> bool {
        if !Self::affordance_visible(status) {
            tracing::debug!(
                "transfer: affordance hidden for status {:?}, not opening",
                status.as_str()
            );
            return false;
        }
        self.modal_open = true;
        true
    }

    /// Close the modal. Always available.
    pub fn close(&mut self) {
        self.modal_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.modal_open
    }
}
