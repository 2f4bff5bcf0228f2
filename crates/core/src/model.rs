//! Registry of supported keyboard models and their protocol parameters.
//!
//! Each model is an immutable value record. The order of `colors` is the
//! order the firmware indexes them in, so entries must never be sorted.

/// Single-byte command codes for one keyboard model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcodes {
    /// First byte of every command payload.
    pub prefix: u8,
    pub change_profile: u8,
    pub change_settings: u8,
    pub change_led: u8,
    pub change_polling_rate: u8,
    /// Flag byte in the settings command that disables the Windows key.
    pub windows_key_off: u8,
}

/// A supported keyboard model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardModel {
    /// Display name.
    pub name: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Supported polling rates in Hz.
    pub polling_rates: &'static [u16],
    /// Color names; the position is the protocol color index.
    pub colors: &'static [&'static str],
    pub opcodes: Opcodes,
}

impl KeyboardModel {
    /// Position of `color` in the color table (exact match).
    pub fn color_index(&self, color: &str) -> Option<u8> {
        self.colors
            .iter()
            .position(|c| *c == color)
            .and_then(|idx| u8::try_from(idx).ok())
    }

    /// Whether the model accepts `hz` as a polling rate.
    pub fn supports_polling_rate(&self, hz: u16) -> bool {
        self.polling_rates.contains(&hz)
    }

    /// Whether this model is identified by the given USB IDs.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

/// Sharkoon's OEM (Holtek) USB vendor ID.
pub const HOLTEK_VID: u16 = 0x04D9;

/// Known product IDs.
pub mod pids {
    /// Skiller Pro Plus.
    pub const SKILLER_PRO_PLUS: u16 = 0xA096;
}

/// Every model this tool can drive.
pub static MODELS: &[KeyboardModel] = &[KeyboardModel {
    name: "Skiller Pro Plus",
    vendor_id: HOLTEK_VID,
    product_id: pids::SKILLER_PRO_PLUS,
    polling_rates: &[125, 250, 500, 1000],
    colors: &[
        "red",
        "green",
        "darkblue",
        "purple",
        "turquois",
        "yellow",
        "lightblue",
    ],
    opcodes: Opcodes {
        prefix: 0x07,
        change_profile: 0x02,
        change_settings: 0x0B,
        change_led: 0x0A,
        change_polling_rate: 0x01,
        windows_key_off: 0x01,
    },
}];

/// Look up a model by USB vendor/product ID.
pub fn lookup(vendor_id: u16, product_id: u16) -> Option<&'static KeyboardModel> {
    MODELS.iter().find(|m| m.matches(vendor_id, product_id))
}
