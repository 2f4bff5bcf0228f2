//! USB transport abstraction for device communication.
//!
//! Provides a trait-based transport layer so that the real libusb handle
//! and a mock device share the same interface.

use crate::error::{Error, Result};
use crate::protocol::{Command, COMMAND_LEN};
use std::time::Duration;
use tracing::{trace, warn};

/// Timeout for a single control transfer.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(1);

/// Abstraction over an opened keyboard.
///
/// Implementations issue the fixed class control request
/// (see [`crate::protocol`]) and report how many bytes were written.
pub trait ControlTransport {
    /// Claim the controlling interface, detaching the kernel driver.
    fn claim(&mut self) -> Result<()>;

    /// Release the controlling interface.
    fn release(&mut self) -> Result<()>;

    /// Send `payload` as one control transfer and return the byte count.
    fn write_control(&mut self, payload: &[u8]) -> Result<usize>;
}

/// Send one command and require the full payload to be written.
pub fn send_command(transport: &mut dyn ControlTransport, command: &Command) -> Result<()> {
    trace!(
        kind = %command.kind,
        payload_hex = format_args!("{:02X?}", command.bytes),
        "control TX"
    );

    let written = transport.write_control(&command.bytes)?;
    if written != COMMAND_LEN {
        warn!(
            kind = %command.kind,
            written,
            expected = COMMAND_LEN,
            "short control transfer"
        );
        return Err(Error::ShortWrite {
            written,
            expected: COMMAND_LEN,
        });
    }

    Ok(())
}

/// A mock transport for testing.
///
/// Records every payload and can be scripted to fail individual transfers.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted outcome of one transfer.
    #[derive(Debug)]
    pub enum Reply {
        Written(usize),
        Fail(rusb::Error),
    }

    /// Mock transport that records transfers and replays scripted replies.
    ///
    /// Transfers without a scripted reply succeed with the full length.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        pub sent: Vec<Vec<u8>>,
        pub claimed: bool,
        pub claim_calls: usize,
        pub release_calls: usize,
        pub fail_claim: bool,
        pub fail_release: bool,
        replies: VecDeque<Reply>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the outcome of the next unscripted transfer.
        pub fn reply(&mut self, reply: Reply) {
            self.replies.push_back(reply);
        }
    }

    impl ControlTransport for MockTransport {
        fn claim(&mut self) -> Result<()> {
            self.claim_calls += 1;
            if self.fail_claim {
                return Err(Error::Usb(rusb::Error::Busy));
            }
            self.claimed = true;
            Ok(())
        }

        fn release(&mut self) -> Result<()> {
            self.release_calls += 1;
            if self.fail_release {
                return Err(Error::Usb(rusb::Error::NoDevice));
            }
            self.claimed = false;
            Ok(())
        }

        fn write_control(&mut self, payload: &[u8]) -> Result<usize> {
            self.sent.push(payload.to_vec());
            match self.replies.pop_front() {
                Some(Reply::Written(n)) => Ok(n),
                Some(Reply::Fail(e)) => Err(Error::Usb(e)),
                None => Ok(payload.len()),
            }
        }
    }
}
