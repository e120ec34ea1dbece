pub mod dump;
pub mod ffmpeg;
pub mod waterfall;
