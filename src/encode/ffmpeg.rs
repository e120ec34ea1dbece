use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Output video settings.
pub struct VideoSettings<'a> {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: &'a str,
    pub pix_fmt: &'a str,
    pub crf: u32,
}

/// Pipes 8-bit grayscale frames into ffmpeg and muxes the source audio back in.
pub struct FfmpegEncoder {
    child: Child,
    frame_len: usize,
}

pub fn build_args(output_path: &Path, input_audio: &Path, video: &VideoSettings<'_>) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "gray".into(),
        "-video_size".into(), format!("{}x{}", video.width, video.height),
        "-framerate".into(), video.fps.to_string(),
        "-i".into(), "pipe:0".into(),
        "-i".into(), input_audio.display().to_string(),
        "-c:v".into(), video.codec.to_string(),
        "-pix_fmt".into(), video.pix_fmt.to_string(),
        "-crf".into(), video.crf.to_string(),
        "-preset".into(), "medium".into(),
        "-c:a".into(), "aac".into(),
        "-b:a".into(), "192k".into(),
        "-shortest".into(),
        output_path.display().to_string(),
    ]
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, input_audio: &Path, video: &VideoSettings<'_>) -> Result<Self> {
        let args = build_args(output_path, input_audio, video);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            video.width,
            video.height,
            video.fps,
            video.codec
        );

        Ok(Self {
            child,
            frame_len: video.width as usize * video.height as usize,
        })
    }

    pub fn write_frame(&mut self, gray_pixels: &[u8]) -> Result<()> {
        if gray_pixels.len() != self.frame_len {
            anyhow::bail!(
                "Frame is {} bytes, encoder expects {}",
                gray_pixels.len(),
                self.frame_len
            );
        }
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(gray_pixels).context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}
