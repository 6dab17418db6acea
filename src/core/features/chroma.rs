//! Chroma (pitch-class energy) extraction
//!
//! Converts an STFT power spectrogram into 12 pitch-class rows. Each bin
//! above `MIN_FREQ_HZ` contributes its power to the class of its nearest
//! equal-tempered note (C = row 0). Every frame is then scaled so its
//! strongest class is 1.0; silent frames stay zero.

use super::{check_signal, FeatureMatrix};
use crate::config::ChromaSettings;
use crate::core::dsp::StftProcessor;
use crate::core::error::FeatureError;
use crate::core::signal::AudioSignal;

pub const CHROMA_BINS: usize = 12;

/// C1; bins below this carry no usable pitch
const MIN_FREQ_HZ: f32 = 32.703;

/// Frames whose strongest class is below this are treated as silent
const SILENCE_FLOOR: f32 = 1e-10;

/// Extract a 12-row chroma matrix.
pub fn extract_chroma(
    signal: &AudioSignal,
    settings: &ChromaSettings,
    role: &'static str,
) -> Result<FeatureMatrix, FeatureError> {
    check_signal(signal, role)?;

    let stft = StftProcessor::new(settings.fft_size, settings.hop_size)?;
    let spectra = stft.magnitudes(signal.samples())?;
    let classes = pitch_classes(settings.fft_size, signal.sample_rate());

    let mut rows = vec![Vec::with_capacity(spectra.len()); CHROMA_BINS];
    for spectrum in &spectra {
        let mut frame = [0.0f32; CHROMA_BINS];
        for (mag, class) in spectrum.iter().zip(classes.iter()) {
            if let Some(c) = class {
                frame[*c] += mag * mag;
            }
        }

        let peak = frame.iter().copied().fold(0.0f32, f32::max);
        let scale = if peak > SILENCE_FLOOR { 1.0 / peak } else { 0.0 };
        for (row, value) in rows.iter_mut().zip(frame.iter()) {
            row.push(value * scale);
        }
    }

    log::debug!(
        "Chroma ({}): {} frames from {} samples",
        role,
        spectra.len(),
        signal.len()
    );

    Ok(FeatureMatrix::new(rows, settings.hop_size, signal.sample_rate()))
}

/// Pitch class of each FFT bin, `None` for bins outside the pitched range
fn pitch_classes(fft_size: usize, sample_rate: u32) -> Vec<Option<usize>> {
    let bin_hz = sample_rate as f32 / fft_size as f32;
    (0..=fft_size / 2)
        .map(|bin| {
            let freq = bin as f32 * bin_hz;
            if freq < MIN_FREQ_HZ {
                return None;
            }
            let midi = 69.0 + 12.0 * (freq / 440.0).log2();
            Some((midi.round() as i64).rem_euclid(CHROMA_BINS as i64) as usize)
        })
        .collect()
}
