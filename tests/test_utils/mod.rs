#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use audiomatchr::testgen::{chirp, embed, melody};
use audiomatchr::AudioSignal;
use uuid::Uuid;

pub const SR: u32 = 22050;

pub fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_audiomatchr"))
}

/// Fresh directory under the system temp dir; removed on drop
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// 0.4 s sweep used as the pattern throughout
pub fn sweep() -> Vec<f32> {
    chirp(8820, SR, 300.0, 3000.0)
}

/// Target of `secs` seconds with (offset, gain) copies of the sweep
pub fn scene(secs: f32, copies: &[(f32, f32)]) -> (AudioSignal, AudioSignal) {
    let pattern = sweep();
    let mut target = vec![0.0f32; (secs * SR as f32) as usize];
    for &(offset, gain) in copies {
        embed(&mut target, &pattern, &[offset], SR, gain);
    }
    (AudioSignal::new(pattern, SR), AudioSignal::new(target, SR))
}

/// C6 up to F#6: seven pitch classes, all inside one contrast octave band
pub const PHRASE_NOTES: [f32; 7] = [1046.50, 1108.73, 1174.66, 1244.51, 1318.51, 1396.91, 1479.98];

/// Stepped-tone phrase lasting `secs` seconds
pub fn phrase(secs: f32) -> Vec<f32> {
    melody((secs * SR as f32).round() as usize, SR, &PHRASE_NOTES)
}

/// Target of `target_secs` seconds holding `pattern` once at `offset`
pub fn scene_with(pattern: Vec<f32>, target_secs: f32, offset: f32) -> (AudioSignal, AudioSignal) {
    let mut target = vec![0.0f32; (target_secs * SR as f32) as usize];
    embed(&mut target, &pattern, &[offset], SR, 1.0);
    (AudioSignal::new(pattern, SR), AudioSignal::new(target, SR))
}

/// Deterministic uniform noise in [-amp, amp]
pub fn noise(len: usize, amp: f32, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            amp * (2.0 * unit - 1.0)
        })
        .collect()
}
