use log::warn;
use serde::Deserialize;
use std::fmt;
use web_sys::window;

use crate::gesture::{ROTATION_DIVISOR, SWIPE_THRESHOLD};
use crate::profiles::BatchShape;

const CONFIG_ELEMENT_ID: &str = "deck-config";
const MAX_ANIMATION_MS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub batch_size: usize,
    pub threshold_px: f64,
    pub rotation_divisor: f64,
    pub snap_back_ms: u32,
    pub exit_ms: u32,
    pub removal_delay_ms: u32,
    pub photos_per_profile: usize,
    pub tag_draws: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            batch_size: 12,
            threshold_px: SWIPE_THRESHOLD,
            rotation_divisor: ROTATION_DIVISOR,
            snap_back_ms: 200,
            exit_ms: 250,
            removal_delay_ms: 260,
            photos_per_profile: 3,
            tag_draws: 4,
        }
    }
}

impl DeckConfig {
    /// Clamps values the controller relies on. Removal always lands after the
    /// exit animation has finished.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.batch_size = self.batch_size.max(1);
        self.photos_per_profile = self.photos_per_profile.max(1);
        self.tag_draws = self.tag_draws.max(1);
        if !(self.threshold_px.is_finite() && self.threshold_px > 0.0) {
            self.threshold_px = defaults.threshold_px;
        }
        if !(self.rotation_divisor.is_finite() && self.rotation_divisor > 0.0) {
            self.rotation_divisor = defaults.rotation_divisor;
        }
        self.exit_ms = self.exit_ms.min(MAX_ANIMATION_MS);
        self.snap_back_ms = self.snap_back_ms.min(MAX_ANIMATION_MS);
        if self.removal_delay_ms <= self.exit_ms {
            self.removal_delay_ms = self.exit_ms.saturating_add(10);
        }
        self
    }

    pub fn batch_shape(&self) -> BatchShape {
        BatchShape {
            count: self.batch_size,
            photos_per_profile: self.photos_per_profile,
            tag_draws: self.tag_draws,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
}

impl ConfigError {
    fn parse<E: fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(message) => write!(f, "invalid deck config: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn parse_config(text: &str) -> Result<DeckConfig, ConfigError> {
    serde_json::from_str::<DeckConfig>(text)
        .map(DeckConfig::sanitized)
        .map_err(ConfigError::parse)
}

/// Reads the JSON block embedded in the host page, if any.
pub fn load_config() -> DeckConfig {
    let text = window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return DeckConfig::default();
    }

    match parse_config(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("Falling back to default deck config: {}", err);
            DeckConfig::default()
        }
    }
}
