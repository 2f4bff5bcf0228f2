//! skiller-core: model registry, device matching, and the Skiller
//! control-transfer protocol.
//!
//! This crate holds everything needed to drive Sharkoon Skiller keyboards
//! over libusb: which models exist, how connected devices are matched and
//! selected, and how each setting is encoded into an 8-byte payload.

pub mod comm;
pub mod device;
pub mod error;
pub mod model;
pub mod power;
pub mod protocol;
pub mod request;
pub mod safety;
pub mod transport;
