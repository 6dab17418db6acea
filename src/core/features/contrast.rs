//! Spectral contrast (octave-band peak/valley difference)
//!
//! Bands: `[0, fmin]`, then octaves `[fmin·2^(k-1), fmin·2^k]` for
//! `k = 1..n_bands`, where the last band also takes everything up to
//! Nyquist. Each band above the first borrows the bin just below its lower
//! edge, and every band but the last drops its top bin. Per frame, the peak
//! and valley are the means of the strongest and weakest `quantile` of the
//! band's magnitudes and the row value is their ratio in dB.

use super::{check_signal, FeatureMatrix};
use crate::config::SpectralSettings;
use crate::core::dsp::StftProcessor;
use crate::core::error::FeatureError;
use crate::core::signal::AudioSignal;

/// Floor applied before taking logs, so silence has zero contrast
const AMIN: f32 = 1e-10;

/// Extract an `n_bands + 1` row spectral-contrast matrix.
pub fn extract_spectral_contrast(
    signal: &AudioSignal,
    settings: &SpectralSettings,
    role: &'static str,
) -> Result<FeatureMatrix, FeatureError> {
    check_signal(signal, role)?;

    let stft = StftProcessor::new(settings.fft_size, settings.hop_size)?;
    let bands = band_bins(settings, signal.sample_rate())?;
    let spectra = stft.magnitudes(signal.samples())?;

    let mut rows = vec![Vec::with_capacity(spectra.len()); bands.len()];
    let mut scratch = Vec::new();

    for spectrum in &spectra {
        for (row, band) in rows.iter_mut().zip(bands.iter()) {
            scratch.clear();
            scratch.extend_from_slice(&spectrum[band.start..band.end]);
            scratch.sort_unstable_by(|a, b| a.total_cmp(b));

            let take = band.quantile_len;
            let valley = scratch[..take].iter().sum::<f32>() / take as f32;
            let peak = scratch[scratch.len() - take..].iter().sum::<f32>() / take as f32;

            row.push(power_db(peak) - power_db(valley));
        }
    }

    log::debug!(
        "Spectral contrast ({}): {} bands x {} frames",
        role,
        rows.len(),
        spectra.len()
    );

    Ok(FeatureMatrix::new(rows, settings.hop_size, signal.sample_rate()))
}

fn power_db(value: f32) -> f32 {
    10.0 * value.max(AMIN).log10()
}

#[derive(Debug, Clone, PartialEq)]
struct BandBins {
    start: usize,
    end: usize,
    quantile_len: usize,
}

fn band_bins(settings: &SpectralSettings, sample_rate: u32) -> Result<Vec<BandBins>, FeatureError> {
    let num_bins = settings.fft_size / 2 + 1;
    let bin_hz = sample_rate as f32 / settings.fft_size as f32;
    let freq = |bin: usize| bin as f32 * bin_hz;

    let mut edges = vec![0.0f32];
    edges.extend((0..=settings.n_bands).map(|k| settings.fmin * 2f32.powi(k as i32)));

    let mut bands = Vec::with_capacity(settings.n_bands + 1);
    for k in 0..=settings.n_bands {
        let (lo, hi) = (edges[k], edges[k + 1]);
        let inside: Vec<usize> = (0..num_bins)
            .filter(|&b| freq(b) >= lo && freq(b) <= hi)
            .collect();

        let (Some(&first), Some(&last)) = (inside.first(), inside.last()) else {
            return Err(FeatureError::BandAboveNyquist { band: k, low_hz: lo });
        };

        let start = if k > 0 { first.saturating_sub(1) } else { first };
        let mut end = if k == settings.n_bands { num_bins } else { last + 1 };
        let band_size = end - start;

        if k < settings.n_bands && end - start > 1 {
            end -= 1;
        }

        let quantile_len = ((settings.quantile * band_size as f32).round() as usize)
            .max(1)
            .min(end - start);

        bands.push(BandBins {
            start,
            end,
            quantile_len,
        });
    }

    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_band_layout_at_22050() {
        let settings = SpectralSettings::default();
        let bands = band_bins(&settings, 22050).unwrap();
        assert_eq!(bands.len(), 7);
        // [0, 200] Hz covers bins 0..=18, minus the top bin
        assert_eq!(bands[0], BandBins { start: 0, end: 18, quantile_len: 1 });
        // Last band runs to Nyquist
        assert_eq!(bands[6].end, 1025);
    }

    #[test]
    fn test_band_beyond_nyquist_is_an_error() {
        let settings = SpectralSettings::default();
        // Nyquist 2 kHz leaves the 3.2-6.4 kHz band empty
        assert!(matches!(
            band_bins(&settings, 4000),
            Err(FeatureError::BandAboveNyquist { band: 5, .. })
        ));
    }

    #[test]
    fn test_silence_has_zero_contrast() {
        let silence = AudioSignal::new(vec![0.0; 8192], 22050);
        let contrast =
            extract_spectral_contrast(&silence, &SpectralSettings::default(), "target").unwrap();
        assert_eq!(contrast.channel_count(), 7);
        assert!(contrast.rows().iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tone_raises_contrast_in_its_band() {
        let sr = 22050;
        let samples: Vec<f32> = (0..sr as usize)
            .map(|i| 0.5 * (2.0 * PI * 1000.0 * i as f32 / sr as f32).sin())
            .collect();
        let contrast = extract_spectral_contrast(
            &AudioSignal::new(samples, sr),
            &SpectralSettings::default(),
            "pattern",
        )
        .unwrap();

        let mid = contrast.frame_count() / 2;
        // 1 kHz sits in the 800-1600 Hz band (row 3)
        let row3 = contrast.rows()[3][mid];
        assert!(row3 > 20.0, "contrast {}", row3);
        assert!(contrast.rows().iter().flatten().all(|v| v.is_finite()));
    }
}
