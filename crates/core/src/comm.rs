//! Device communication layer: runs a command plan against a transport.
//!
//! Transfers are never retried. A failed command is recorded and the next
//! one is still sent; the interface is released at the end whatever
//! happened in between.

use crate::error::Error;
use crate::protocol::{Command, CommandKind};
use crate::transport::{send_command, ControlTransport};
use std::time::Duration;
use tracing::{debug, warn};

/// Pause after every transfer so the firmware can apply the change.
pub const INTER_COMMAND_DELAY: Duration = Duration::from_millis(100);

/// A command that could not be delivered.
#[derive(Debug)]
pub struct CommandFailure {
    pub kind: CommandKind,
    pub error: Error,
}

/// Outcome of [`apply_commands`].
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Commands that were written in full.
    pub sent: usize,
    pub failures: Vec<CommandFailure>,
    /// Claim failure, if any. Transfers are still attempted.
    pub claim_error: Option<Error>,
    pub release_error: Option<Error>,
}

impl ApplyReport {
    /// Whether every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.claim_error.is_none() && self.release_error.is_none()
    }
}

/// Claim the interface, send `commands` in order with `delay` after each
/// one, then release the interface.
pub fn apply_commands(
    transport: &mut dyn ControlTransport,
    commands: &[Command],
    delay: Duration,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    let claimed = match transport.claim() {
        Ok(()) => true,
        Err(e) => {
            warn!("claiming interface failed: {}", e);
            report.claim_error = Some(e);
            false
        }
    };

    for command in commands {
        debug!(command = %command, "sending command");
        match send_command(transport, command) {
            Ok(()) => report.sent += 1,
            Err(error) => {
                warn!(kind = %command.kind, "command failed: {}", error);
                report.failures.push(CommandFailure {
                    kind: command.kind,
                    error,
                });
            }
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    if claimed {
        if let Err(e) = transport.release() {
            warn!("releasing interface failed: {}", e);
            report.release_error = Some(e);
        }
    }

    debug!(
        sent = report.sent,
        failed = report.failures.len(),
        "command plan finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MODELS;
    use crate::protocol::Brightness;
    use crate::transport::mock::{MockTransport, Reply};
    use std::time::Instant;

    fn plan() -> Vec<Command> {
        let model = &MODELS[0];
        vec![
            Command::change_profile(model, 2).unwrap(),
            Command::change_led(model, 2, Brightness::Level(5), "green").unwrap(),
        ]
    }

    #[test]
    fn apply_sends_all_and_releases() {
        let mut mock = MockTransport::new();
        let commands = plan();

        let report = apply_commands(&mut mock, &commands, Duration::ZERO);
        assert!(report.is_clean());
        assert_eq!(report.sent, 2);
        assert_eq!(mock.sent.len(), 2);
        assert_eq!(
            mock.sent[1],
            vec![0x07, 0x0A, 0x02, 0x05, 0x04, 0x00, 0x01, 0x00]
        );
        assert_eq!(mock.claim_calls, 1);
        assert_eq!(mock.release_calls, 1);
        assert!(!mock.claimed);
    }

    #[test]
    fn short_write_does_not_stop_next_command() {
        let mut mock = MockTransport::new();
        mock.reply(Reply::Written(6));
        let commands = plan();

        let report = apply_commands(&mut mock, &commands, Duration::ZERO);
        assert_eq!(mock.sent.len(), 2);
        assert_eq!(report.sent, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, CommandKind::ChangeProfile);
        assert_eq!(mock.release_calls, 1);
    }

    #[test]
    fn usb_error_is_recorded_and_release_still_happens() {
        let mut mock = MockTransport::new();
        mock.reply(Reply::Written(8));
        mock.reply(Reply::Fail(rusb::Error::Timeout));
        let commands = plan();

        let report = apply_commands(&mut mock, &commands, Duration::ZERO);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, CommandKind::ChangeLed);
        assert!(!report.is_clean());
        assert_eq!(mock.release_calls, 1);
    }

    #[test]
    fn claim_failure_still_attempts_transfers_but_skips_release() {
        let mut mock = MockTransport::new();
        mock.fail_claim = true;
        let commands = plan();

        let report = apply_commands(&mut mock, &commands, Duration::ZERO);
        assert!(report.claim_error.is_some());
        assert_eq!(mock.sent.len(), 2);
        assert_eq!(mock.release_calls, 0);
    }

    #[test]
    fn release_failure_is_reported() {
        let mut mock = MockTransport::new();
        mock.fail_release = true;

        let report = apply_commands(&mut mock, &plan(), Duration::ZERO);
        assert_eq!(report.sent, 2);
        assert!(report.release_error.is_some());
        assert!(!report.is_clean());
    }

    #[test]
    fn delay_applies_after_every_transfer() {
        let mut mock = MockTransport::new();
        mock.reply(Reply::Fail(rusb::Error::Pipe));
        let delay = Duration::from_millis(5);

        let start = Instant::now();
        apply_commands(&mut mock, &plan(), delay);
        assert!(start.elapsed() >= delay * 2);
    }
}
