use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub shaping: ShapingSection,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_history")]
    pub history: usize,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_crf")]
    pub crf: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShapingSection {
    /// Built-in preset name or preset file path
    #[serde(default)]
    pub preset: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            fps: default_fps(),
            history: default_history(),
            codec: default_codec(),
            crf: default_crf(),
        }
    }
}

fn default_bins() -> usize { 512 }
fn default_fps() -> u32 { 60 }
fn default_history() -> usize { 256 }
fn default_codec() -> String { "libx264".into() }
fn default_crf() -> u32 { 18 }

pub fn parse_config(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Invalid config: {}", e);
            None
        }
    }
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_config(&content)
}
