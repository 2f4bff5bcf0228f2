//! Parsed user request and the command plan derived from it.

use crate::error::Result;
use crate::model::KeyboardModel;
use crate::protocol::{Brightness, Command};

/// Requested LED change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedRequest {
    pub brightness: Brightness,
    pub color: String,
}

/// Everything one invocation asks for. Built once from the command line
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Ordinal of the target among supported devices.
    pub device: usize,
    /// Profile slot used by the profile, settings and LED commands.
    pub profile: u8,
    /// Send a profile-change command for `profile`.
    pub change_profile: bool,
    /// `Some(false)` disables the Windows key, `Some(true)` enables it.
    pub windows_key: Option<bool>,
    pub led: Option<LedRequest>,
    /// Polling rate in Hz; checked against the model once it is known.
    pub polling_rate: Option<u16>,
    pub list_devices: bool,
    pub list_colors: bool,
    pub always_on: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            device: 0,
            profile: 1,
            change_profile: false,
            windows_key: None,
            led: None,
            polling_rate: None,
            list_devices: false,
            list_colors: false,
            always_on: false,
        }
    }
}

impl Request {
    /// Whether any command needs to be sent to the keyboard.
    pub fn needs_transfer(&self) -> bool {
        self.change_profile
            || self.windows_key.is_some()
            || self.led.is_some()
            || self.polling_rate.is_some()
    }

    /// Whether the request asks for anything at all.
    pub fn has_action(&self) -> bool {
        self.needs_transfer() || self.list_devices || self.list_colors || self.always_on
    }

    /// Encode every requested command for `model`, in send order.
    ///
    /// Fails on the first invalid parameter, so nothing is sent unless the
    /// whole plan is valid.
    pub fn plan(&self, model: &KeyboardModel) -> Result<Vec<Command>> {
        let mut commands = Vec::new();

        if self.change_profile {
            commands.push(Command::change_profile(model, self.profile)?);
        }
        if let Some(enabled) = self.windows_key {
            commands.push(Command::change_settings(model, self.profile, enabled)?);
        }
        if let Some(led) = &self.led {
            commands.push(Command::change_led(
                model,
                self.profile,
                led.brightness,
                &led.color,
            )?);
        }
        if let Some(hz) = self.polling_rate {
            commands.push(Command::change_polling_rate(model, hz)?);
        }

        Ok(commands)
    }
}
