//! Display settings and tuning
//!
//! Persisted in LocalStorage on the web; plain JSON everywhere else.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Fragments spawned per explosion
    pub fn explosion_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 80,
            QualityPreset::High => 120,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Canvas ===
    /// Alpha of the black fill erased from the canvas every tick
    pub fade_alpha: f32,
    /// Global hue at startup (degrees)
    pub hue_start: f32,
    /// Global hue advance per tick (degrees)
    pub hue_step: f32,

    // === Launch cadence ===
    /// Ticks between autonomous launches
    pub auto_launch_ticks: u32,
    /// Minimum ticks between pointer-driven launches
    pub pointer_launch_ticks: u32,

    // === Smoke ===
    /// Smoke puffs per explosion
    pub smoke_particles: usize,
    /// Upper bound for smoke drift speed (pixels/tick)
    pub max_smoke_velocity: f32,
    /// Sprite opacity
    pub smoke_opacity: f32,
    /// Multiply sprite opacity by the puff's remaining alpha
    pub smoke_fades: bool,
    /// Drawn sprite edge length (pixels)
    pub smoke_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            fade_alpha: 0.5,
            hue_start: 120.0,
            hue_step: 0.5,

            auto_launch_ticks: 80,
            pointer_launch_ticks: 5,

            smoke_particles: 1,
            max_smoke_velocity: 1.0,
            smoke_opacity: 0.3,
            smoke_fades: false,
            smoke_size: 96.0,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Fragments spawned per explosion
    pub fn explosion_particles(&self) -> usize {
        self.quality.explosion_particles()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fireworks_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native: read a JSON file named by `FIREWORKS_SETTINGS`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("FIREWORKS_SETTINGS") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring settings in {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.explosion_particles(), 80);
        assert_eq!(s.smoke_particles, 1);
        assert_eq!(s.auto_launch_ticks, 80);
        assert_eq!(s.pointer_launch_ticks, 5);
        assert_eq!(s.hue_start, 120.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"quality":"High","smoke_fades":true}"#).unwrap();
        assert_eq!(s.quality, QualityPreset::High);
        assert_eq!(s.explosion_particles(), 120);
        assert!(s.smoke_fades);
        assert_eq!(s.fade_alpha, 0.5);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{\"quality\": 3}").is_err());
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(
            Settings::from_preset(QualityPreset::Low).explosion_particles(),
            40
        );
    }
}
