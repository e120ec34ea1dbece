mod cli;
mod config;
mod encode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use cli::Cli;
use encode::dump::TextureDump;
use encode::ffmpeg::{FfmpegEncoder, VideoSettings};
use encode::waterfall::Waterfall;
use spectex::audio::{analysis, decode};
use spectex::shaping::{preset, ShapingState, WeightingMode};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();
    apply_config_file(&mut cli);

    if cli.list_presets {
        println!("Built-in presets:");
        for name in preset::builtin_names() {
            println!("  {}", name);
        }
        return Ok(());
    }

    // 1. Resolve the shaping preset
    let mut active = preset::resolve(&cli.preset)
        .with_context(|| format!("Failed to load preset '{}'", cli.preset))?;
    if let Some(mode) = cli.mode {
        let mode = WeightingMode::from(mode);
        if active.config.weighting_mode != mode {
            log::info!("Weighting mode overridden: {} -> {}", active.config.weighting_mode.name(), mode.name());
            active.config.weighting_mode = mode;
        }
    }
    log::info!(
        "Preset '{}' (mode {}, {} display bins)",
        active.name,
        active.config.weighting_mode.name(),
        cli.bins
    );

    if let Some(ref path) = cli.export_preset {
        preset::save_preset(path, &active)?;
    }

    let input = match cli.input.clone() {
        Some(path) => path,
        None if cli.export_preset.is_some() => return Ok(()),
        None => anyhow::bail!("No input audio file given (see --help)"),
    };
    if cli.bins == 0 {
        anyhow::bail!("--bins must be at least 1");
    }

    // 2. Decode + analyse (the FFT source)
    let audio = decode::decode_audio(&input)?;
    let track = analysis::analyze(&audio, cli.fps, active.config.analyser_smoothing)?;

    // 3. Sinks
    let mut dump = cli.dump.as_deref().map(TextureDump::create).transpose()?;
    let mut waterfall = Waterfall::new(cli.bins, cli.history);
    let mut encoder = match cli.output {
        Some(ref path) => Some(FfmpegEncoder::new(
            path,
            &input,
            &VideoSettings {
                width: waterfall.width() as u32,
                height: waterfall.rows() as u32,
                fps: cli.fps,
                codec: &cli.codec,
                pix_fmt: &cli.pix_fmt,
                crf: cli.crf,
            },
        )?),
        None => None,
    };
    if dump.is_none() && encoder.is_none() {
        log::warn!("No --output or --dump given; shaping for statistics only");
    }

    // 4. Shape every frame
    log::info!("Shaping {} frames...", track.frames.len());
    let pb = ProgressBar::new(track.frames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut state = ShapingState::new(cli.bins);
    state.activate();
    let mut level_sum = 0u64;

    for (frame_idx, snapshot) in track.frames.iter().enumerate() {
        let frame = snapshot.as_frame(track.sample_rate);
        let output = state.shape(&frame, &active.config, snapshot.is_beat);
        level_sum += output.iter().map(|&v| v as u64).sum::<u64>();

        if let Some(ref mut dump) = dump {
            dump.write_row(output)?;
        }
        if let Some(ref mut encoder) = encoder {
            waterfall.push_row(output);
            encoder.write_frame(waterfall.image())?;
        }
        pb.set_position(frame_idx as u64 + 1);
    }
    state.deactivate();
    pb.finish_with_message("Shaping complete");

    let cells = (track.frames.len() * cli.bins).max(1) as f64;
    log::info!(
        "Mean level {:.1}/255, final AGC gain {:.3}",
        level_sum as f64 / cells,
        state.agc_gain()
    );

    // 5. Finish sinks
    if let Some(dump) = dump {
        let rows = dump.finish()?;
        log::info!("Texture dump: {} rows x {} bins", rows, cli.bins);
    }
    if let Some(encoder) = encoder {
        log::info!("Finishing encoding...");
        encoder.finish()?;
    }

    log::info!("Done!");
    Ok(())
}

/// Explicit --config path, or auto-detect ./spectex.toml / the user config dir.
fn find_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = PathBuf::from("spectex.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("spectex").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("spectex").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    })
}

/// Config values apply only where the CLI is still at its default.
fn apply_config_file(cli: &mut Cli) {
    let Some(path) = find_config_path(cli.config.clone()) else {
        return;
    };
    let Some(cfg) = config::load_config(&path) else {
        log::warn!("Failed to load config from {}", path.display());
        return;
    };
    log::info!("Loaded config from {}", path.display());

    if cli.bins == 512 { cli.bins = cfg.output.bins; }
    if cli.fps == 60 { cli.fps = cfg.output.fps; }
    if cli.history == 256 { cli.history = cfg.output.history; }
    if cli.codec == "libx264" { cli.codec = cfg.output.codec; }
    if cli.crf == 18 { cli.crf = cfg.output.crf; }
    if cli.preset == "ae" {
        if let Some(preset) = cfg.shaping.preset {
            cli.preset = preset;
        }
    }
}
