use crate::action::Command;
use crate::error::{Result, SwitcherError};
use tokio::sync::mpsc;

/// Cloneable handle for feeding the switching service's queue.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: mpsc::Sender<Command>,
}

impl ActionSender {
    pub(crate) fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    /// Queue a command, waiting for room.
    pub async fn send(&self, command: impl Into<Command>) -> Result<()> {
        self.tx
            .send(command.into())
            .await
            .map_err(|_| SwitcherError::QueueClosed)
    }

    /// Queue a command from a plain thread (pollers, listeners).
    ///
    /// Must not be called from inside the async runtime.
    pub fn blocking_send(&self, command: impl Into<Command>) -> Result<()> {
        self.tx
            .blocking_send(command.into())
            .map_err(|_| SwitcherError::QueueClosed)
    }

    /// Queue a command without waiting; for callbacks that run on the
    /// main run loop.
    pub fn try_send(&self, command: impl Into<Command>) -> Result<()> {
        self.tx.try_send(command.into()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SwitcherError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SwitcherError::QueueClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn test_try_send_reports_full_and_closed() {
        let (tx, rx) = mpsc::channel(1);
        let sender = ActionSender::new(tx);

        sender.try_send(Action::Start).unwrap();
        assert!(matches!(
            sender.try_send(Action::Start),
            Err(SwitcherError::QueueFull)
        ));

        drop(rx);
        assert!(matches!(
            sender.try_send(Action::Start),
            Err(SwitcherError::QueueClosed)
        ));
    }
}
