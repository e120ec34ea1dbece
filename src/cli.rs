use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use spectex::shaping::WeightingMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Ae,
    Fv2,
}

impl From<ModeArg> for WeightingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ae => WeightingMode::Ae,
            ModeArg::Fv2 => WeightingMode::Fv2,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "spectex", about = "Shape audio spectra into display-ready spectrum textures")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Waterfall video of the shaped spectrum (requires ffmpeg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raw texture dump: one row of display bins (u8) per frame
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Display bins per frame (texture width)
    #[arg(long, default_value_t = 512)]
    pub bins: usize,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Waterfall height in rows
    #[arg(long, default_value_t = 256)]
    pub history: usize,

    /// Built-in preset name or path to a preset JSON file
    #[arg(short, long, default_value = "ae")]
    pub preset: String,

    /// Override the preset's weighting mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Write the effective preset to this JSON file
    #[arg(long)]
    pub export_preset: Option<PathBuf>,

    /// List built-in presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Config file (defaults to ./spectex.toml or ~/.config/spectex/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// H.264 CRF quality (0-51, lower = better)
    #[arg(long, default_value_t = 18)]
    pub crf: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["spectex", "song.flac"]);
        assert_eq!(cli.input, Some(PathBuf::from("song.flac")));
        assert_eq!(cli.bins, 512);
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.preset, "ae");
        assert!(cli.mode.is_none());
    }

    #[test]
    fn mode_override_parses() {
        let cli = Cli::parse_from(["spectex", "--mode", "fv2", "--dump", "out.u8", "in.wav"]);
        assert_eq!(cli.mode.map(WeightingMode::from), Some(WeightingMode::Fv2));
        assert_eq!(cli.dump, Some(PathBuf::from("out.u8")));
    }
}
