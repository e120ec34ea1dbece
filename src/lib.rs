pub mod audio;
pub mod shaping;
