use forms::notice::{Notice, SubmitResolution};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState<T> {
    #[default]
    Idle,
    Confirming(T),
    Deleting(T),
}

/// The one DELETE a confirmed dialog is allowed to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket<T> {
    pub target: T,
}

/// Confirm-before-delete dialog for one kind of record (`noun` is e.g.
/// "Student", used in the notices).
#[derive(Debug, Clone)]
pub struct DeleteFlow<T> {
    noun: &'static str,
    state: DeleteState<T>,
}

impl<T: Clone> DeleteFlow<T> {
    pub fn new(noun: &'static str) -> Self {
        Self {
            noun,
            state: DeleteState::Idle,
        }
    }

    pub fn state(&self) -> &DeleteState<T> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DeleteState::Idle)
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.state, DeleteState::Deleting(_))
    }

    pub fn target(&self) -> Option<&T> {
        match &self.state {
            DeleteState::Idle => None,
            DeleteState::Confirming(target) | DeleteState::Deleting(target) => Some(target),
        }
    }

    /// Opens the dialog. Ignored while another delete is pending.
    pub fn request(&mut self, target: T) -> bool {
        if self.is_deleting() {
            return false;
        }
        self.state = DeleteState::Confirming(target);
        true
    }

    pub fn cancel(&mut self) {
        if let DeleteState::Confirming(_) = self.state {
            self.state = DeleteState::Idle;
        }
    }

    pub fn confirm(&mut self) -> Option<DeleteTicket<T>> {
        let DeleteState::Confirming(target) = &self.state else {
            return None;
        };
        let target = target.clone();
        self.state = DeleteState::Deleting(target.clone());
        debug!(noun = self.noun, "delete confirmed");
        Some(DeleteTicket { target })
    }

    /// Closes the dialog either way; only success asks for a refresh.
    pub fn finish(&mut self, result: Result<(), String>) -> Option<SubmitResolution> {
        if !self.is_deleting() {
            return None;
        }
        self.state = DeleteState::Idle;
        let resolution = match result {
            Ok(()) => SubmitResolution::done(Notice::success(format!(
                "{} deleted successfully",
                self.noun
            ))),
            Err(reason) => {
                debug!(noun = self.noun, %reason, "delete failed");
                SubmitResolution {
                    notice: Notice::error(format!(
                        "Failed to delete {}",
                        self.noun.to_lowercase()
                    )),
                    close: true,
                    refresh: false,
                }
            }
        };
        Some(resolution)
    }
}
