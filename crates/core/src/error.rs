//! Error types for skiller-core.

use std::path::PathBuf;
use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// libusb call failed (enumeration, open, claim, transfer).
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// No matched keyboard at the requested ordinal.
    #[error("requested device #{ordinal} not found ({matched} supported device(s) connected)")]
    DeviceNotFound { ordinal: usize, matched: usize },

    /// Value out of safe range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Color name is not in the model's color table.
    #[error("color \"{color}\" not available on {model}")]
    UnknownColor { color: String, model: &'static str },

    /// Polling rate is not in the model's supported set.
    #[error("unsupported polling rate {hz} Hz for {model} (supported: {supported})")]
    UnsupportedPollingRate {
        hz: u16,
        model: &'static str,
        supported: String,
    },

    /// Control transfer wrote fewer bytes than the command length.
    #[error("short control transfer: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Writing the sysfs power policy failed.
    #[error("opening {} failed: {source}", .path.display())]
    PowerPolicy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The device exposes no USB port path, so its sysfs node is unknown.
    #[error("no USB port path known for bus {bus} device {address}")]
    NoPortPath { bus: u8, address: u8 },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
