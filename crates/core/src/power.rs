//! USB runtime power management override via sysfs.
//!
//! Writing `on` to `<sysfs node>/power/level` keeps the kernel from
//! autosuspending the keyboard.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the kernel exposes USB device nodes.
pub const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";

/// sysfs node name for a device: `<bus>-<port>[.<port>...]`.
///
/// Returns `None` when the port path is unknown.
pub fn node_name(bus: u8, ports: &[u8]) -> Option<String> {
    let (first, rest) = ports.split_first()?;
    let mut name = format!("{bus}-{first}");
    for port in rest {
        name.push('.');
        name.push_str(&port.to_string());
    }
    Some(name)
}

/// Path of the power-level control file under `root`.
pub fn power_level_path(root: &Path, node: &str) -> PathBuf {
    root.join(node).join("power").join("level")
}

/// Force the device's power policy to "always on".
pub fn force_always_on(root: &Path, node: &str) -> Result<PathBuf> {
    let path = power_level_path(root, node);
    std::fs::write(&path, b"on\n").map_err(|source| Error::PowerPolicy {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "power policy set to always on");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_name_single_port() {
        assert_eq!(node_name(1, &[4]).as_deref(), Some("1-4"));
    }

    #[test]
    fn node_name_hub_chain() {
        assert_eq!(node_name(3, &[1, 2, 7]).as_deref(), Some("3-1.2.7"));
    }

    #[test]
    fn node_name_without_ports() {
        assert_eq!(node_name(1, &[]), None);
    }

    #[test]
    fn power_level_path_layout() {
        let path = power_level_path(Path::new(SYSFS_USB_DEVICES), "1-2.3");
        assert_eq!(path, PathBuf::from("/sys/bus/usb/devices/1-2.3/power/level"));
    }

    #[test]
    fn force_always_on_writes_on() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("2-1").join("power")).unwrap();

        let path = force_always_on(root.path(), "2-1").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "on\n");
    }

    #[test]
    fn force_always_on_missing_node_is_error() {
        let root = tempfile::tempdir().unwrap();

        let err = force_always_on(root.path(), "9-9").unwrap_err();
        assert!(matches!(err, Error::PowerPolicy { .. }));
        assert!(err.to_string().starts_with("opening "));
    }
}
