//! Safety layer: validates every user-supplied parameter before it is
//! encoded into a command.
//!
//! ## Ranges
//! - **Profile**: 1–3 (three on-device slots)
//! - **Brightness**: 0–10; pulsing and disco are separate modes, not levels
//! - **Windows key**: 0 (disabled) or 1 (enabled)
//! - **Polling rate**: only the rates the selected model declares
//! - **Color**: only names in the selected model's color table
//!
//! Profile, brightness and Windows-key checks need no device. Color and
//! polling-rate checks need the selected model and run after matching,
//! but still before the interface is claimed.

use crate::error::{Error, Result};
use crate::model::KeyboardModel;

pub const PROFILE_MIN: u8 = 1;
pub const PROFILE_MAX: u8 = 3;

pub const BRIGHTNESS_MIN: u8 = 0;
pub const BRIGHTNESS_MAX: u8 = 10;

/// Validate a profile slot number.
pub fn validate_profile(profile: u8) -> Result<u8> {
    if !(PROFILE_MIN..=PROFILE_MAX).contains(&profile) {
        return Err(Error::OutOfRange {
            field: "profile",
            value: profile as u32,
            min: PROFILE_MIN as u32,
            max: PROFILE_MAX as u32,
        });
    }
    Ok(profile)
}

/// Validate a static brightness level.
pub fn validate_brightness(level: u8) -> Result<u8> {
    if level > BRIGHTNESS_MAX {
        return Err(Error::OutOfRange {
            field: "brightness",
            value: level as u32,
            min: BRIGHTNESS_MIN as u32,
            max: BRIGHTNESS_MAX as u32,
        });
    }
    Ok(level)
}

/// Validate a Windows-key state (0 = off, 1 = on).
pub fn validate_windows_key(state: u8) -> Result<bool> {
    match state {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::OutOfRange {
            field: "windows_key",
            value: other as u32,
            min: 0,
            max: 1,
        }),
    }
}

/// Validate a polling rate against the model and return the interval
/// divisor the firmware expects (1000 / hz).
pub fn validate_polling_rate(model: &KeyboardModel, hz: u16) -> Result<u8> {
    if !model.supports_polling_rate(hz) {
        return Err(Error::UnsupportedPollingRate {
            hz,
            model: model.name,
            supported: model
                .polling_rates
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    u8::try_from(1000 / hz).map_err(|_| Error::UnsupportedPollingRate {
        hz,
        model: model.name,
        supported: format!("rates of at least {} Hz", 1000 / u16::from(u8::MAX) + 1),
    })
}

/// Resolve a color name to its protocol index on this model.
pub fn resolve_color(model: &KeyboardModel, color: &str) -> Result<u8> {
    model.color_index(color).ok_or_else(|| Error::UnknownColor {
        color: color.to_string(),
        model: model.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MODELS;

    fn skiller() -> &'static KeyboardModel {
        &MODELS[0]
    }

    #[test]
    fn validate_profile_in_range() {
        for p in 1..=3 {
            assert_eq!(validate_profile(p).unwrap(), p);
        }
    }

    #[test]
    fn validate_profile_rejects_out_of_range() {
        assert!(validate_profile(0).is_err());
        assert!(validate_profile(4).is_err());
        assert!(validate_profile(255).is_err());
    }

    #[test]
    fn validate_brightness_bounds() {
        assert_eq!(validate_brightness(0).unwrap(), 0);
        assert_eq!(validate_brightness(10).unwrap(), 10);
        assert!(validate_brightness(11).is_err());
        assert!(validate_brightness(0x0C).is_err());
    }

    #[test]
    fn validate_windows_key_states() {
        assert!(!validate_windows_key(0).unwrap());
        assert!(validate_windows_key(1).unwrap());
        assert!(validate_windows_key(2).is_err());
    }

    #[test]
    fn polling_rate_divisors() {
        let model = skiller();
        for hz in model.polling_rates {
            let divisor = validate_polling_rate(model, *hz).unwrap();
            assert_eq!(divisor as u32 * *hz as u32, 1000);
        }
        assert_eq!(validate_polling_rate(model, 125).unwrap(), 8);
        assert_eq!(validate_polling_rate(model, 250).unwrap(), 4);
        assert_eq!(validate_polling_rate(model, 500).unwrap(), 2);
        assert_eq!(validate_polling_rate(model, 1000).unwrap(), 1);
    }

    #[test]
    fn polling_rate_rejects_undeclared() {
        let err = validate_polling_rate(skiller(), 333).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPollingRate { hz: 333, .. }));
        assert!(err.to_string().contains("125, 250, 500, 1000"));
        assert!(validate_polling_rate(skiller(), 0).is_err());
    }

    #[test]
    fn polling_rate_divisor_must_fit_in_a_byte() {
        let slow = KeyboardModel {
            polling_rates: &[2, 125],
            ..*skiller()
        };
        assert_eq!(validate_polling_rate(&slow, 125).unwrap(), 8);
        let err = validate_polling_rate(&slow, 2).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPollingRate { hz: 2, .. }));
    }

    #[test]
    fn resolve_color_known_and_unknown() {
        assert_eq!(resolve_color(skiller(), "green").unwrap(), 1);
        assert_eq!(resolve_color(skiller(), "turquois").unwrap(), 4);
        let err = resolve_color(skiller(), "pink").unwrap_err();
        assert_eq!(
            err.to_string(),
            "color \"pink\" not available on Skiller Pro Plus"
        );
    }
}
