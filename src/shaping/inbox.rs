use std::sync::mpsc::{self, Receiver, Sender};

use super::params::ShapingConfig;

/// Sending half, held by whoever edits presets (a UI thread, a file watcher).
#[derive(Clone)]
pub struct ConfigSender {
    tx: Sender<ShapingConfig>,
}

impl ConfigSender {
    /// Queue a replacement config. Returns false once the render side is gone.
    pub fn send(&self, config: ShapingConfig) -> bool {
        self.tx.send(config).is_ok()
    }
}

/// Receiving half, owned by the thread that runs the pipeline. Drained once
/// at the start of each frame so a config never changes mid-frame.
pub struct ConfigInbox {
    rx: Receiver<ShapingConfig>,
    current: ShapingConfig,
}

pub fn config_channel(initial: ShapingConfig) -> (ConfigSender, ConfigInbox) {
    let (tx, rx) = mpsc::channel();
    (ConfigSender { tx }, ConfigInbox { rx, current: initial })
}

impl ConfigInbox {
    /// Apply everything queued since the last frame (latest wins) and return
    /// the config for this frame.
    pub fn take_latest(&mut self) -> &ShapingConfig {
        let mut swapped = 0usize;
        while let Ok(config) = self.rx.try_recv() {
            self.current = config;
            swapped += 1;
        }
        if swapped > 0 {
            log::debug!("Shaping config swapped ({} update(s) queued)", swapped);
        }
        &self.current
    }

    pub fn current(&self) -> &ShapingConfig {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::frame::SpectrumFrame;
    use crate::shaping::params::WeightingMode;
    use crate::shaping::state::ShapingState;

    #[test]
    fn latest_update_wins() {
        let (tx, mut inbox) = config_channel(ShapingConfig::default());
        assert_eq!(inbox.take_latest().attack, ShapingConfig::default().attack);

        tx.send(ShapingConfig { attack: 0.2, ..ShapingConfig::default() });
        tx.send(ShapingConfig { attack: 0.9, ..ShapingConfig::default() });
        assert_eq!(inbox.take_latest().attack, 0.9);
        // Nothing new: the previous config stays
        assert_eq!(inbox.take_latest().attack, 0.9);
    }

    #[test]
    fn send_reports_closed_inbox() {
        let (tx, inbox) = config_channel(ShapingConfig::default());
        drop(inbox);
        assert!(!tx.send(ShapingConfig::default()));
    }

    #[test]
    fn updates_from_another_thread_apply_at_frame_start() {
        let (tx, mut inbox) = config_channel(ShapingConfig::default());
        let mut state = ShapingState::new(32);
        state.activate();
        let bins = [0.6f32; 64];
        let frame = SpectrumFrame::normalized(&bins, 44100.0);

        std::thread::spawn(move || {
            tx.send(ShapingConfig::for_mode(WeightingMode::Fv2));
        })
        .join()
        .unwrap();

        let config = inbox.take_latest().clone();
        assert_eq!(config.weighting_mode, WeightingMode::Fv2);
        state.shape(&frame, &config, false);
        assert_eq!(inbox.current().weighting_mode, WeightingMode::Fv2);
    }
}
