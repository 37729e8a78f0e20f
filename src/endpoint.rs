//! Endpoint catalogue and the body checks each endpoint must satisfy.

use crate::error::{ProbeError, ProbeResult};
use crate::http::ProbeResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Firmware variant running on the DUT.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareProfile {
    /// Root page, `/status` and `/info`.
    #[default]
    Basic,
    /// Everything in `Basic` plus the LED control routes.
    Led,
}

impl FirmwareProfile {
    /// Endpoints served by this firmware variant, in probe order.
    pub fn endpoints(self) -> &'static [Endpoint] {
        match self {
            Self::Basic => &[Endpoint::Root, Endpoint::Status, Endpoint::Info],
            Self::Led => &Endpoint::ALL,
        }
    }
}

impl fmt::Display for FirmwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Led => "led",
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Root,
    Status,
    Info,
    #[value(name = "ledon")]
    LedOn,
    #[value(name = "ledoff")]
    LedOff,
    #[value(name = "ledtoggle")]
    LedToggle,
}

const ROOT_TEXT: &[&str] = &["ESP32 Web Server"];
const ROOT_TEXT_LED: &[&str] = &["ESP32 Web Server", "LED"];

const STATUS_KEYS: &[&str] = &["uptime", "free_heap", "min_free_heap", "cpu_freq_mhz"];
const STATUS_KEYS_LED: &[&str] = &[
    "uptime",
    "free_heap",
    "min_free_heap",
    "led_state",
    "chip_model",
    "cores",
];
const INFO_KEYS: &[&str] = &["model", "cores", "features", "revision", "flash_size_mb"];

// Russian firmware text first, English builds second.
const LED_ON_TEXT: &[&str] = &["включен", "ON"];
const LED_OFF_TEXT: &[&str] = &["выключен", "OFF"];
const LED_TOGGLED_TEXT: &[&str] = &["переключен", "toggled"];

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Root,
        Endpoint::Status,
        Endpoint::Info,
        Endpoint::LedOn,
        Endpoint::LedOff,
        Endpoint::LedToggle,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "",
            Self::Status => "/status",
            Self::Info => "/info",
            Self::LedOn => "/ledon",
            Self::LedOff => "/ledoff",
            Self::LedToggle => "/ledtoggle",
        }
    }

    /// Whether a successful GET changes the device's physical state.
    pub fn has_side_effects(self) -> bool {
        matches!(self, Self::LedOn | Self::LedOff | Self::LedToggle)
    }

    pub fn expectation(self, profile: FirmwareProfile) -> Expectation {
        match (self, profile) {
            (Self::Root, FirmwareProfile::Basic) => Expectation::ContainsAll(ROOT_TEXT),
            (Self::Root, FirmwareProfile::Led) => Expectation::ContainsAll(ROOT_TEXT_LED),
            (Self::Status, FirmwareProfile::Basic) => Expectation::JsonKeys(STATUS_KEYS),
            (Self::Status, FirmwareProfile::Led) => Expectation::JsonKeys(STATUS_KEYS_LED),
            (Self::Info, _) => Expectation::JsonKeys(INFO_KEYS),
            (Self::LedOn, _) => Expectation::ContainsAny(LED_ON_TEXT),
            (Self::LedOff, _) => Expectation::ContainsAny(LED_OFF_TEXT),
            (Self::LedToggle, _) => Expectation::ContainsAny(LED_TOGGLED_TEXT),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.pad("/"),
            other => f.pad(other.path()),
        }
    }
}

/// What the body of a 200 response must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Every substring must appear.
    ContainsAll(&'static [&'static str]),
    /// At least one substring must appear (localized variants of one message).
    ContainsAny(&'static [&'static str]),
    /// Body is a JSON object holding every key; extra keys are ignored.
    JsonKeys(&'static [&'static str]),
}

impl Expectation {
    pub fn check(&self, response: &ProbeResponse) -> ProbeResult<()> {
        match *self {
            Self::ContainsAll(needles) => {
                match needles.iter().find(|n| !response.body.contains(**n)) {
                    Some(missing) => Err(ProbeError::MissingSubstring {
                        url: response.url.clone(),
                        expected: vec![missing.to_string()],
                    }),
                    None => Ok(()),
                }
            }
            Self::ContainsAny(needles) => {
                if needles.iter().any(|n| response.body.contains(n)) {
                    Ok(())
                } else {
                    Err(ProbeError::MissingSubstring {
                        url: response.url.clone(),
                        expected: needles.iter().map(|n| n.to_string()).collect(),
                    })
                }
            }
            Self::JsonKeys(keys) => {
                let value = response.json()?;
                let missing = keys
                    .iter()
                    .find(|key| value.as_object().map_or(true, |obj| !obj.contains_key(**key)));
                match missing {
                    Some(key) => Err(ProbeError::MissingKey {
                        url: response.url.clone(),
                        key: key.to_string(),
                    }),
                    None => Ok(()),
                }
            }
        }
    }
}
