//! Skiller control-transfer protocol encoding.
//!
//! Every command is an 8-byte payload sent as a class SET_REPORT on
//! interface 1:
//!
//! ```text
//! byte  0       1        2        3           4     5  6       7
//!      prefix  opcode   param..   param..     ...
//! ```
//!
//! - Change profile:  `[prefix, change_profile, profile, 0, 0, 0, 0, 0]`
//! - Change settings: `[prefix, change_settings, profile, flag, 0, 0, 0, 0]`
//! - Change LED:      `[prefix, change_led, profile, brightness, 0x04, 0, color, 0]`
//! - Polling rate:    `[prefix, change_polling_rate, 1000 / hz, 0, 0, 0, 0, 0]`
//!
//! Enabling the Windows key is encoded as the absence of the
//! `windows_key_off` flag; there is no "on" opcode.

use crate::error::Result;
use crate::model::KeyboardModel;
use crate::safety;
use std::fmt;

/// Payload length of every command.
pub const COMMAND_LEN: usize = 8;

/// bmRequestType: host-to-device, class, interface.
pub const REQUEST_TYPE: u8 = 0x21;
/// bRequest: HID SET_REPORT.
pub const REQUEST: u8 = 0x09;
/// wValue: feature report 0x07.
pub const VALUE: u16 = 0x0307;
/// wIndex: controlling interface.
pub const INDEX: u16 = 0x0001;
/// Interface claimed for the duration of the transfers.
pub const INTERFACE: u8 = 1;

/// Fixed byte 4 of the LED command. Required by the firmware.
pub const LED_MODE: u8 = 0x04;

/// Brightness byte for pulsing ("breathing") mode.
pub const BRIGHTNESS_PULSING: u8 = 0x0B;
/// Brightness byte for disco mode (pulsing with rotating color).
pub const BRIGHTNESS_DISCO: u8 = 0x0C;

/// LED brightness setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    /// Static level 0–10.
    Level(u8),
    Pulsing,
    Disco,
}

impl Brightness {
    /// Validated static level.
    pub fn level(level: u8) -> Result<Self> {
        safety::validate_brightness(level).map(Self::Level)
    }

    /// Byte sent in position 3 of the LED command.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Level(level) => *level,
            Self::Pulsing => BRIGHTNESS_PULSING,
            Self::Disco => BRIGHTNESS_DISCO,
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::Level(safety::BRIGHTNESS_MAX)
    }
}

/// Which setting a command changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ChangeProfile,
    ChangeSettings,
    ChangeLed,
    ChangePollingRate,
}

impl CommandKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChangeProfile => "change profile",
            Self::ChangeSettings => "change settings",
            Self::ChangeLed => "change LED",
            Self::ChangePollingRate => "change polling rate",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One encoded control-transfer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub bytes: [u8; COMMAND_LEN],
}

impl Command {
    fn new(kind: CommandKind, model: &KeyboardModel, opcode: u8, params: &[u8]) -> Self {
        let mut bytes = [0u8; COMMAND_LEN];
        bytes[0] = model.opcodes.prefix;
        bytes[1] = opcode;
        bytes[2..2 + params.len()].copy_from_slice(params);
        Self { kind, bytes }
    }

    /// Switch the active profile.
    pub fn change_profile(model: &KeyboardModel, profile: u8) -> Result<Self> {
        let profile = safety::validate_profile(profile)?;
        Ok(Self::new(
            CommandKind::ChangeProfile,
            model,
            model.opcodes.change_profile,
            &[profile],
        ))
    }

    /// Enable or disable the Windows key on `profile`.
    pub fn change_settings(model: &KeyboardModel, profile: u8, windows_key: bool) -> Result<Self> {
        let profile = safety::validate_profile(profile)?;
        let flag = if windows_key {
            0x00
        } else {
            model.opcodes.windows_key_off
        };
        Ok(Self::new(
            CommandKind::ChangeSettings,
            model,
            model.opcodes.change_settings,
            &[profile, flag],
        ))
    }

    /// Set LED brightness/effect and color on `profile`.
    pub fn change_led(
        model: &KeyboardModel,
        profile: u8,
        brightness: Brightness,
        color: &str,
    ) -> Result<Self> {
        let profile = safety::validate_profile(profile)?;
        if let Brightness::Level(level) = brightness {
            safety::validate_brightness(level)?;
        }
        let color_idx = safety::resolve_color(model, color)?;
        Ok(Self::new(
            CommandKind::ChangeLed,
            model,
            model.opcodes.change_led,
            &[profile, brightness.as_byte(), LED_MODE, 0x00, color_idx],
        ))
    }

    /// Change the USB polling rate.
    pub fn change_polling_rate(model: &KeyboardModel, hz: u16) -> Result<Self> {
        let divisor = safety::validate_polling_rate(model, hz)?;
        Ok(Self::new(
            CommandKind::ChangePollingRate,
            model,
            model.opcodes.change_polling_rate,
            &[divisor],
        ))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02X?}", self.kind, self.bytes)
    }
}
