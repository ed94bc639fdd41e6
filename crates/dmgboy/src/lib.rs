use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dmgboy_core::frontend::frame_to_rgb24;
use dmgboy_core::{Color, Display, GameBoy, GameBoyConfig, Input, JoypadState};

/// Keeps the most recent frame as packed RGB24.
#[derive(Default)]
pub struct HeadlessDisplay {
    pub frames: u64,
    pub last_rgb: Vec<u8>,
}

impl Display for HeadlessDisplay {
    fn present(&mut self, frame: &[u8], palette: &[Color; 4]) {
        self.frames += 1;
        self.last_rgb = frame_to_rgb24(frame, palette);
    }
}

/// No buttons held; asks to stop once `limit` frames have been polled.
pub struct FrameLimit {
    limit: Option<u64>,
    polled: u64,
}

impl FrameLimit {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit, polled: 0 }
    }
}

impl Input for FrameLimit {
    fn poll(&mut self) -> JoypadState {
        self.polled += 1;
        JoypadState::default()
    }

    fn should_stop(&mut self) -> bool {
        self.limit.is_some_and(|limit| self.polled >= limit)
    }
}

pub struct RunOptions {
    pub rom: PathBuf,
    /// Stop after this many frames; run forever when `None`.
    pub frames: Option<u64>,
    /// Where to write the final frame as raw RGB24.
    pub dump: Option<PathBuf>,
    pub frame_pacing: bool,
}

pub fn run(options: &RunOptions) -> Result<()> {
    let config = GameBoyConfig::builder()
        .frame_pacing(options.frame_pacing)
        .build();
    let mut gb = GameBoy::with_config(config);
    gb.load_cartridge_file(&options.rom)
        .with_context(|| format!("loading '{}'", options.rom.display()))?;

    let mut display = HeadlessDisplay::default();
    let mut input = FrameLimit::new(options.frames);
    gb.run(&mut display, &mut input)
        .context("emulation stopped with an error")?;

    if !gb.serial_output().is_empty() {
        println!("{}", String::from_utf8_lossy(gb.serial_output()));
    }

    if let Some(path) = &options.dump {
        write_dump(path, &display.last_rgb)?;
        println!(
            "Wrote {} bytes ({}x{} rgb24) after {} frames to '{}'",
            display.last_rgb.len(),
            dmgboy_core::SCREEN_WIDTH,
            dmgboy_core::SCREEN_HEIGHT,
            display.frames,
            path.display()
        );
    }
    Ok(())
}

fn write_dump(path: &Path, rgb: &[u8]) -> Result<()> {
    std::fs::write(path, rgb).with_context(|| format!("writing '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_limit_stops_after_limit() {
        let mut input = FrameLimit::new(Some(2));
        assert!(!input.should_stop());
        input.poll();
        input.poll();
        assert!(input.should_stop());

        let mut forever = FrameLimit::new(None);
        for _ in 0..100 {
            forever.poll();
        }
        assert!(!forever.should_stop());
    }

    #[test]
    fn headless_display_keeps_rgb() {
        let mut display = HeadlessDisplay::default();
        let frame = vec![3u8; dmgboy_core::SCREEN_WIDTH * dmgboy_core::SCREEN_HEIGHT];
        display.present(&frame, &dmgboy_core::DMG_PALETTE);
        assert_eq!(display.frames, 1);
        assert_eq!(display.last_rgb.len(), frame.len() * 3);
        assert!(display.last_rgb.iter().all(|&b| b == 0));
    }
}
