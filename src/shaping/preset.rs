use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::params::{ShapingConfig, WeightingMode};

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("failed to access preset file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("preset must be a JSON object of fields")]
    NotAnObject,
    #[error("unknown preset '{name}'. Built-in presets: {available}")]
    UnknownPreset { name: String, available: String },
}

/// A named shaping configuration. Serializes as one flat object:
/// `name` plus every `ShapingConfig` field under its camelCase key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(flatten)]
    pub config: ShapingConfig,
}

const BUILTIN: &[(&str, WeightingMode)] = &[("ae", WeightingMode::Ae), ("fv2", WeightingMode::Fv2)];

pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

pub fn builtin(name: &str) -> Option<Preset> {
    BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(n, mode)| Preset::new(*n, ShapingConfig::for_mode(*mode)))
}

impl Preset {
    pub fn new(name: impl Into<String>, config: ShapingConfig) -> Self {
        Self { name: name.into(), config }
    }

    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a preset leniently.
    ///
    /// Missing fields take the defaults of the preset's weighting mode,
    /// fields with the wrong type and unknown keys are skipped, and numeric
    /// values are clamped into range. Every skip and clamp is logged.
    pub fn from_json(text: &str) -> Result<Self, PresetError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut incoming) = value else {
            return Err(PresetError::NotAnObject);
        };

        let name = match incoming.remove("name") {
            Some(Value::String(name)) => name,
            Some(other) => {
                log::warn!("Preset name {} is not a string; using 'custom'", other);
                "custom".to_string()
            }
            None => "custom".to_string(),
        };

        let mode = incoming
            .get("weightingMode")
            .and_then(|v| serde_json::from_value::<WeightingMode>(v.clone()).ok())
            .unwrap_or_default();

        let Value::Object(mut merged) = serde_json::to_value(ShapingConfig::for_mode(mode))? else {
            return Err(PresetError::NotAnObject);
        };
        for (key, value) in incoming {
            if !merged.contains_key(&key) {
                log::warn!("Preset '{}': ignoring unknown field '{}'", name, key);
                continue;
            }
            if accepts(&merged, &key, &value) {
                merged.insert(key, value);
            } else {
                log::warn!("Preset '{}': invalid value {} for '{}', keeping default", name, value, key);
            }
        }

        let mut config: ShapingConfig = serde_json::from_value(Value::Object(merged))?;
        for adj in config.clamp() {
            log::warn!(
                "Preset '{}': {} = {} out of range, clamped to {}",
                name,
                adj.key,
                adj.from,
                adj.to
            );
        }

        Ok(Self { name, config })
    }
}

/// Whether `value` deserializes in place of `key` in an otherwise valid field map.
fn accepts(fields: &Map<String, Value>, key: &str, value: &Value) -> bool {
    let mut trial = fields.clone();
    trial.insert(key.to_string(), value.clone());
    serde_json::from_value::<ShapingConfig>(Value::Object(trial)).is_ok()
}

pub fn load_preset(path: &Path) -> Result<Preset, PresetError> {
    let text = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let preset = Preset::from_json(&text)?;
    log::info!("Loaded preset '{}' from {}", preset.name, path.display());
    Ok(preset)
}

pub fn save_preset(path: &Path, preset: &Preset) -> Result<(), PresetError> {
    let json = preset.to_json()?;
    std::fs::write(path, json).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved preset '{}' to {}", preset.name, path.display());
    Ok(())
}

/// A built-in preset name, or a path to a preset file.
pub fn resolve(name_or_path: &str) -> Result<Preset, PresetError> {
    if let Some(preset) = builtin(name_or_path) {
        return Ok(preset);
    }
    let path = Path::new(name_or_path);
    if path.exists() {
        return load_preset(path);
    }
    Err(PresetError::UnknownPreset {
        name: name_or_path.to_string(),
        available: builtin_names().join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::params::{SpatialKernel, PARAM_RANGES};

    fn tweaked() -> ShapingConfig {
        ShapingConfig {
            weighting_mode: WeightingMode::Fv2,
            spatial_kernel: SpatialKernel::Wide,
            use_bin_floor: false,
            kick_hz: 57.123_456,
            kick_width_oct: 0.654_321,
            baseline_percentile: 0.013_579,
            min_db: -97.531,
            agc_release: 0.000_123,
            ..ShapingConfig::default()
        }
    }

    #[test]
    fn round_trips_every_field() {
        let preset = Preset::new("tweaked", tweaked());
        let json = preset.to_json().unwrap();
        let back = Preset::from_json(&json).unwrap();
        assert_eq!(back.name, "tweaked");
        assert_eq!(back.config.weighting_mode, WeightingMode::Fv2);
        assert_eq!(back.config.spatial_kernel, SpatialKernel::Wide);
        assert!(!back.config.use_bin_floor);

        let a = serde_json::to_value(&preset.config).unwrap();
        let b = serde_json::to_value(&back.config).unwrap();
        for range in PARAM_RANGES.iter() {
            let x = a[range.key].as_f64().unwrap();
            let y = b[range.key].as_f64().unwrap();
            assert!((x - y).abs() <= 1e-6, "{}: {} vs {}", range.key, x, y);
        }
        assert_eq!(back.config, preset.config);
    }

    #[test]
    fn serializes_flat_with_exact_keys() {
        let json: Value = serde_json::from_str(&Preset::new("p", tweaked()).to_json().unwrap()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["name"], "p");
        for key in ["weightingMode", "spatialKernel", "useBinFloor", "beatBoostEnabled"] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        for range in PARAM_RANGES.iter() {
            assert!(object[range.key].is_number(), "missing {}", range.key);
        }
        assert_eq!(object.len(), 1 + 4 + PARAM_RANGES.len());
    }

    #[test]
    fn out_of_range_fields_are_clamped_not_rejected() {
        let preset = Preset::from_json(r#"{"name": "hot", "kickHz": 5000, "beatBoost": -1, "tiltHi": 2.0}"#).unwrap();
        assert_eq!(preset.config.kick_hz, 200.0);
        assert_eq!(preset.config.beat_boost, 0.0);
        assert_eq!(preset.config.tilt_hi, 2.0);
    }

    #[test]
    fn missing_fields_take_mode_defaults() {
        let preset = Preset::from_json(r#"{"weightingMode": "fv2", "attack": 0.3}"#).unwrap();
        let defaults = ShapingConfig::for_mode(WeightingMode::Fv2);
        assert_eq!(preset.name, "custom");
        assert_eq!(preset.config.attack, 0.3);
        assert_eq!(preset.config.peak_curve, defaults.peak_curve);
        assert_eq!(preset.config.spatial_kernel, defaults.spatial_kernel);
    }

    #[test]
    fn bad_values_and_unknown_keys_are_skipped() {
        let preset = Preset::from_json(
            r#"{"name": "messy", "weightingMode": "xyz", "release": "fast", "sparkle": 3, "noiseFloor": 0.1}"#,
        )
        .unwrap();
        let defaults = ShapingConfig::default();
        assert_eq!(preset.config.weighting_mode, WeightingMode::Ae);
        assert_eq!(preset.config.release, defaults.release);
        assert_eq!(preset.config.noise_floor, 0.1);
    }

    #[test]
    fn non_object_is_an_error() {
        assert!(matches!(Preset::from_json("[1, 2]"), Err(PresetError::NotAnObject)));
        assert!(matches!(Preset::from_json("{oops"), Err(PresetError::Json(_))));
    }

    #[test]
    fn builtins_resolve_by_name() {
        assert_eq!(builtin_names(), vec!["ae", "fv2"]);
        let fv2 = resolve("fv2").unwrap();
        assert_eq!(fv2.config, ShapingConfig::for_mode(WeightingMode::Fv2));
        assert!(matches!(
            resolve("definitely-not-a-preset"),
            Err(PresetError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let path = std::env::temp_dir().join(format!("spectex-preset-{}.json", std::process::id()));
        let preset = Preset::new("disk", tweaked());
        save_preset(&path, &preset).unwrap();
        let loaded = resolve(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, preset);
    }
}
