// src/testgen/mod.rs
//
// Synthetic fixture generation for AudioMatchr
// Builds a short pattern clip and a longer target with the pattern embedded
// at known offsets, and writes both as WAV files with a JSON manifest of the
// expected detections.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

/// Hann-tapered linear sweep from `f_start` to `f_end` Hz, peak 0.8.
///
/// The taper keeps the autocorrelation free of strong sidelobes, so a sweep
/// makes a clean, unambiguous pattern.
pub fn chirp(len: usize, sample_rate: u32, f_start: f32, f_end: f32) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    let sr = sample_rate as f32;
    let duration = len as f32 / sr;
    let sweep = (f_end - f_start) / duration;
    (0..len)
        .map(|i| {
            let t = i as f32 / sr;
            let phase = 2.0 * PI * (f_start * t + 0.5 * sweep * t * t);
            let taper = 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos();
            0.8 * taper * phase.sin()
        })
        .collect()
}

/// Tones at `notes` Hz played back to back over `len` samples, peak 0.8.
///
/// Phase runs on across note changes, and 10 ms linear fades shape both ends.
pub fn melody(len: usize, sample_rate: u32, notes: &[f32]) -> Vec<f32> {
    if len == 0 || notes.is_empty() {
        return vec![0.0; len];
    }
    let sr = sample_rate as f32;
    let fade = (sample_rate as usize / 100).clamp(1, len);
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let freq = notes[i * notes.len() / len];
            let level = (i.min(len - 1 - i) as f32 / fade as f32).min(1.0);
            let sample = 0.8 * level * phase.sin();
            phase = (phase + 2.0 * PI * freq / sr) % (2.0 * PI);
            sample
        })
        .collect()
}

/// Mix `pattern` into `target` at each offset (seconds), scaled by `gain`.
/// Copies running past the end are truncated.
pub fn embed(target: &mut [f32], pattern: &[f32], offsets: &[f32], sample_rate: u32, gain: f32) {
    for &offset in offsets {
        let start = (offset * sample_rate as f32).round() as usize;
        if let Some(slot) = target.get_mut(start..) {
            for (t, p) in slot.iter_mut().zip(pattern) {
                *t += gain * p;
            }
        }
    }
}

/// Write mono 32-bit float WAV
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Description of one synthetic pattern/target pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    pub name: String,
    pub sample_rate: u32,
    pub pattern_secs: f32,
    pub target_secs: f32,
    /// Where the pattern starts inside the target
    pub offsets: Vec<f32>,
    pub f_start: f32,
    pub f_end: f32,
    /// Level of each embedded copy relative to the pattern
    pub gain: f32,
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            name: "sweep".to_string(),
            sample_rate: 22050,
            pattern_secs: 0.4,
            target_secs: 10.0,
            offsets: vec![2.0],
            f_start: 300.0,
            f_end: 3000.0,
            gain: 1.0,
        }
    }
}

impl FixtureSpec {
    /// Synthesize (pattern, target) sample buffers
    pub fn render(&self) -> Result<(Vec<f32>, Vec<f32>)> {
        if self.sample_rate == 0 {
            bail!("Fixture sample rate must be positive");
        }
        if self.pattern_secs <= 0.0 || self.pattern_secs > self.target_secs {
            bail!(
                "Pattern length {}s must be positive and no longer than the target ({}s)",
                self.pattern_secs,
                self.target_secs
            );
        }
        if let Some(bad) = self
            .offsets
            .iter()
            .find(|&&o| o < 0.0 || o + self.pattern_secs > self.target_secs)
        {
            bail!("Offset {}s does not fit inside the target", bad);
        }

        let sr = self.sample_rate as f32;
        let pattern = chirp(
            (self.pattern_secs * sr).round() as usize,
            self.sample_rate,
            self.f_start,
            self.f_end,
        );
        let mut target = vec![0.0f32; (self.target_secs * sr).round() as usize];
        embed(&mut target, &pattern, &self.offsets, self.sample_rate, self.gain);
        Ok((pattern, target))
    }
}

/// Paths of a written fixture
#[derive(Debug, Clone)]
pub struct GeneratedFixture {
    pub pattern: PathBuf,
    pub target: PathBuf,
    pub spec: FixtureSpec,
}

/// Writes fixtures into one output directory
pub struct FixtureGenerator {
    output_dir: PathBuf,
}

impl FixtureGenerator {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `<name>_pattern.wav` and `<name>_target.wav`
    pub fn generate(&self, spec: &FixtureSpec) -> Result<GeneratedFixture> {
        let (pattern, target) = spec.render()?;
        let pattern_path = self.output_dir.join(format!("{}_pattern.wav", spec.name));
        let target_path = self.output_dir.join(format!("{}_target.wav", spec.name));

        write_wav(&pattern_path, &pattern, spec.sample_rate)?;
        write_wav(&target_path, &target, spec.sample_rate)?;
        log::info!(
            "Wrote {} and {}",
            pattern_path.display(),
            target_path.display()
        );

        Ok(GeneratedFixture {
            pattern: pattern_path,
            target: target_path,
            spec: spec.clone(),
        })
    }

    /// Generate every fixture and write `manifest.json` next to them
    pub fn generate_all(&self, specs: &[FixtureSpec]) -> Result<FixtureManifest> {
        let mut manifest = FixtureManifest::default();
        for spec in specs {
            let fixture = self.generate(spec)?;
            manifest.fixtures.push(FixtureEntry::from_generated(&fixture));
        }
        manifest.save(self.output_dir.join("manifest.json"))?;
        Ok(manifest)
    }
}

/// Expected outcome of analysing a generated fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub pattern_file: String,
    pub target_file: String,
    pub expected_offsets: Vec<f32>,
    pub spec: FixtureSpec,
}

impl FixtureEntry {
    fn from_generated(fixture: &GeneratedFixture) -> Self {
        let file_name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            pattern_file: file_name(&fixture.pattern),
            target_file: file_name(&fixture.target),
            expected_offsets: fixture.spec.offsets.clone(),
            spec: fixture.spec.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureManifest {
    pub fixtures: Vec<FixtureEntry>,
}

impl FixtureManifest {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
