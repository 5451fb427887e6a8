//! The progress of a deposit, published to observers through a watch channel

use std::fmt::{Display, Formatter, Result as FmtResult};

use tokio::sync::watch;
use tracing::info;

use crate::error::VaultOpError;

/// The phase of an in-flight deposit
///
/// Valid sequences are `Idle → [Approving] → Depositing → Completed | Error`
/// and `Idle → Approving → Error`. A failure before any transaction is
/// submitted moves `Idle → Error` directly
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepositStep {
    /// No deposit is in flight
    #[default]
    Idle,
    /// An approval, permit or approving bundle is being submitted
    Approving,
    /// The deposit is being submitted
    Depositing,
    /// The deposit finished
    Completed,
    /// The deposit failed
    Error,
}

impl DepositStep {
    /// Whether the step machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: DepositStep) -> bool {
        use DepositStep::*;
        matches!(
            (self, next),
            (Idle, Approving)
                | (Idle, Depositing)
                | (Idle, Error)
                | (Approving, Depositing)
                | (Approving, Error)
                | (Depositing, Completed)
                | (Depositing, Error)
        )
    }

    /// Whether a transaction is being submitted or awaited
    pub fn is_processing(&self) -> bool {
        matches!(self, DepositStep::Approving | DepositStep::Depositing)
    }

    /// Whether the deposit has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, DepositStep::Completed | DepositStep::Error)
    }
}

impl Display for DepositStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DepositStep::Idle => write!(f, "Idle"),
            DepositStep::Approving => write!(f, "Approving"),
            DepositStep::Depositing => write!(f, "Depositing"),
            DepositStep::Completed => write!(f, "Completed"),
            DepositStep::Error => write!(f, "Error"),
        }
    }
}

/// Owns the current step and validates every transition
pub struct StepTracker {
    /// The sending half of the step channel
    sender: watch::Sender<DepositStep>,
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StepTracker {
    /// Create a tracker at `Idle`
    pub fn new() -> Self {
        let (sender, _) = watch::channel(DepositStep::Idle);
        Self { sender }
    }

    /// Subscribe to step changes
    pub fn subscribe(&self) -> watch::Receiver<DepositStep> {
        self.sender.subscribe()
    }

    /// The current step
    pub fn current(&self) -> DepositStep {
        *self.sender.borrow()
    }

    /// Start a new sequence at `Idle`
    pub fn reset(&self) {
        self.sender.send_replace(DepositStep::Idle);
    }

    /// Move to the next step
    pub fn advance(&self, next: DepositStep) -> Result<(), VaultOpError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(VaultOpError::missing_context(format!(
                "invalid deposit step transition {current} -> {next}"
            )));
        }

        info!("deposit step: {current} -> {next}");
        self.sender.send_replace(next);
        Ok(())
    }

    /// Move to `Error` from any non-terminal step
    pub fn fail(&self) {
        let current = self.current();
        if current.can_transition_to(DepositStep::Error) {
            info!("deposit step: {current} -> {}", DepositStep::Error);
            self.sender.send_replace(DepositStep::Error);
        }
    }
}
