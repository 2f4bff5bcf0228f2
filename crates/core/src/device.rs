//! Device model: discovery, matching against the registry, and selection.
//!
//! Matching is split from I/O: [`discover_devices`] snapshots what libusb
//! sees, [`match_devices`] is a pure function over that snapshot, and the
//! caller opens exactly the selected device afterwards.

use crate::error::{Error, Result};
use crate::model::{self, KeyboardModel};
use crate::power;
use rusb::UsbContext;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Descriptor-level information about one connected USB device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: u8,
    pub address: u8,
    /// Port numbers from the root hub down; empty if unknown.
    pub ports: Vec<u8>,
}

impl UsbDeviceInfo {
    /// sysfs node name, e.g. `1-2.3`.
    pub fn sysfs_node(&self) -> Option<String> {
        power::node_name(self.bus, &self.ports)
    }
}

/// A libusb device paired with its descriptor snapshot.
pub struct ConnectedDevice<T: UsbContext> {
    pub device: rusb::Device<T>,
    pub info: UsbDeviceInfo,
}

/// A connected device that matched a registry entry.
#[derive(Debug, Clone)]
pub struct MatchedDevice {
    /// Position among matched devices only.
    pub ordinal: usize,
    /// Position in the full enumeration.
    pub index: usize,
    pub model: &'static KeyboardModel,
    pub info: UsbDeviceInfo,
}

impl MatchedDevice {
    /// One line of `-l` output.
    pub fn listing_line(&self) -> String {
        let mut line = format!(
            "{:04x}:{:04x} Bus {:03} Device {:03} \"{}\"",
            self.info.vendor_id,
            self.info.product_id,
            self.info.bus,
            self.info.address,
            self.model.name
        );
        if let Some(node) = self.info.sysfs_node() {
            line.push_str(&format!("\tpath: {}/{}/", power::SYSFS_USB_DEVICES, node));
        }
        line
    }

    /// Serializable view for machine-readable listings.
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            ordinal: self.ordinal,
            vendor_id: self.info.vendor_id,
            product_id: self.info.product_id,
            bus: self.info.bus,
            address: self.info.address,
            model: self.model.name,
            sysfs_path: self
                .info
                .sysfs_node()
                .map(|node| format!("{}/{}", power::SYSFS_USB_DEVICES, node)),
        }
    }

    /// Force the always-on power policy for this device under `sysfs_root`.
    pub fn force_always_on(&self, sysfs_root: &Path) -> Result<()> {
        let node = self.info.sysfs_node().ok_or(Error::NoPortPath {
            bus: self.info.bus,
            address: self.info.address,
        })?;
        power::force_always_on(sysfs_root, &node)?;
        Ok(())
    }
}

/// JSON shape of a listed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub ordinal: usize,
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: u8,
    pub address: u8,
    pub model: &'static str,
    pub sysfs_path: Option<String>,
}

/// Snapshot all USB devices in enumeration order.
///
/// Stops at the first device whose descriptor cannot be read; devices
/// before it keep their positions.
pub fn discover_devices<T: UsbContext>(context: &T) -> Result<Vec<ConnectedDevice<T>>> {
    debug!("Starting USB device enumeration");
    let list = context.devices()?;

    let mut devices = Vec::with_capacity(list.len());
    for device in list.iter() {
        let desc = match device.device_descriptor() {
            Ok(desc) => desc,
            Err(e) => {
                warn!("failed to get device descriptor: {}", e);
                break;
            }
        };
        let ports = device.port_numbers().unwrap_or_else(|e| {
            debug!(
                bus = device.bus_number(),
                address = device.address(),
                "no port numbers: {}",
                e
            );
            Vec::new()
        });
        let info = UsbDeviceInfo {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            bus: device.bus_number(),
            address: device.address(),
            ports,
        };
        devices.push(ConnectedDevice { device, info });
    }

    debug!(count = devices.len(), "Device enumeration complete");
    Ok(devices)
}

/// Match devices against the registry, numbering matches in order.
pub fn match_devices<'a, I>(devices: I) -> Vec<MatchedDevice>
where
    I: IntoIterator<Item = &'a UsbDeviceInfo>,
{
    let mut matched = Vec::new();
    for (index, info) in devices.into_iter().enumerate() {
        let Some(model) = model::lookup(info.vendor_id, info.product_id) else {
            continue;
        };
        info!(
            model = model.name,
            ordinal = matched.len(),
            vid = format_args!("0x{:04X}", info.vendor_id),
            pid = format_args!("0x{:04X}", info.product_id),
            bus = info.bus,
            address = info.address,
            "Found supported keyboard"
        );
        matched.push(MatchedDevice {
            ordinal: matched.len(),
            index,
            model,
            info: info.clone(),
        });
    }
    matched
}

/// Pick the matched device at `ordinal`.
pub fn select(matched: &[MatchedDevice], ordinal: usize) -> Result<&MatchedDevice> {
    matched.get(ordinal).ok_or(Error::DeviceNotFound {
        ordinal,
        matched: matched.len(),
    })
}
