//! FFT-based correlation and short-time spectra

use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::FftPlanner;

use super::windows::hann_window;
use crate::core::error::FeatureError;

/// Circular cross-correlation of `pattern` against `target`.
///
/// The pattern is zero-padded to the target length, so lag `k` of the output
/// is `sum(target[n + k] * pattern[n])` with indices wrapping at the end.
/// Computed as `IFFT(FFT(target) * conj(FFT(pattern)))`.
pub fn cross_correlate(target: &[f32], pattern: &[f32]) -> Vec<f32> {
    let n = target.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut spectrum: Vec<Complex<f64>> = target
        .iter()
        .map(|&s| Complex::new(s as f64, 0.0))
        .collect();
    let mut pattern_spectrum: Vec<Complex<f64>> = pattern
        .iter()
        .take(n)
        .map(|&s| Complex::new(s as f64, 0.0))
        .collect();
    pattern_spectrum.resize(n, Complex::new(0.0, 0.0));

    forward.process(&mut spectrum);
    forward.process(&mut pattern_spectrum);

    for (t, p) in spectrum.iter_mut().zip(pattern_spectrum.iter()) {
        *t *= p.conj();
    }

    inverse.process(&mut spectrum);

    let scale = 1.0 / n as f64;
    spectrum.iter().map(|c| (c.re * scale) as f32).collect()
}

/// Same-length correlation of `a` against `v`, centered on `a`.
///
/// Output index `i` holds `sum(a[i + m - v.len() / 2] * v[m])` over the valid
/// range of `a`, so a perfect alignment of `v` starting at frame `s` peaks at
/// `s + v.len() / 2`. Requires `v.len() <= a.len()`.
pub fn correlate_same(a: &[f32], v: &[f32]) -> Vec<f32> {
    let n = a.len();
    let m = v.len();
    if n == 0 || m == 0 {
        return vec![0.0; n];
    }

    let lead = (m / 2) as isize;
    (0..n as isize)
        .map(|i| {
            let start = i - lead;
            let m_lo = (-start).max(0) as usize;
            let m_hi = ((n as isize - start).min(m as isize)).max(0) as usize;
            (m_lo..m_hi)
                .map(|k| a[(start + k as isize) as usize] * v[k])
                .sum()
        })
        .collect()
}

/// Short-time Fourier transform with centered, zero-padded frames
pub struct StftProcessor {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    fft_size: usize,
    hop_size: usize,
}

impl StftProcessor {
    pub fn new(fft_size: usize, hop_size: usize) -> Result<Self, FeatureError> {
        if fft_size < 2 || hop_size == 0 {
            return Err(FeatureError::InvalidFraming { fft_size, hop_size });
        }
        let mut planner = RealFftPlanner::<f32>::new();
        Ok(Self {
            fft: planner.plan_fft_forward(fft_size),
            window: hann_window(fft_size),
            fft_size,
            hop_size,
        })
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_size
    }

    /// Magnitude spectrogram, one `fft_size / 2 + 1` bin vector per frame.
    ///
    /// Frame `t` is centered on sample `t * hop_size`; the signal is padded
    /// with `fft_size / 2` zeros on each side.
    pub fn magnitudes(&self, samples: &[f32]) -> Result<Vec<Vec<f32>>, FeatureError> {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let num_frames = self.frame_count(samples.len());
        let mut input = self.fft.make_input_vec();
        let mut output = self.fft.make_output_vec();
        let mut frames = Vec::with_capacity(num_frames);

        for frame in 0..num_frames {
            let start = frame * self.hop_size;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = padded.get(start + i).copied().unwrap_or(0.0) * self.window[i];
            }

            self.fft
                .process(&mut input, &mut output)
                .map_err(|e| FeatureError::Fft(e.to_string()))?;

            frames.push(output.iter().map(|c| c.norm()).collect());
        }

        Ok(frames)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_correlate_finds_offset() {
        let pattern = vec![1.0, -2.0, 3.0];
        let mut target = vec![0.0f32; 16];
        target[5..8].copy_from_slice(&pattern);

        let corr = cross_correlate(&target, &pattern);
        assert_eq!(corr.len(), 16);

        let best = corr
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best, 5);
        assert!((corr[5] - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_correlate_same_matches_direct_sum() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(correlate_same(&a, &[1.0, 1.0, 1.0]), vec![3.0, 6.0, 9.0, 12.0, 9.0]);
        assert_eq!(
            correlate_same(&a, &[1.0, 1.0, 1.0, 1.0]),
            vec![3.0, 6.0, 10.0, 14.0, 12.0]
        );
    }

    #[test]
    fn test_correlate_same_peaks_at_pattern_center() {
        let v = [1.0, 2.0, 1.0, 0.5];
        let mut a = vec![0.0f32; 20];
        a[10..14].copy_from_slice(&v);

        let c = correlate_same(&a, &v);
        let best = c
            .iter()
            .enumerate()
            .max_by(|x, y| x.1.total_cmp(y.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best, 10 + v.len() / 2);
    }

    #[test]
    fn test_stft_frame_layout() {
        let stft = StftProcessor::new(256, 64).unwrap();
        let samples: Vec<f32> = (0..1000)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 8000.0).sin())
            .collect();

        let frames = stft.magnitudes(&samples).unwrap();
        assert_eq!(frames.len(), 1 + 1000 / 64);
        assert_eq!(frames[0].len(), 129);

        // 1 kHz at 8 kHz sample rate lands in bin 32 of a 256-point FFT
        let mid = &frames[frames.len() / 2];
        let peak_bin = mid
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, 32);
    }

    #[test]
    fn test_stft_rejects_zero_hop() {
        assert!(matches!(
            StftProcessor::new(512, 0),
            Err(FeatureError::InvalidFraming { .. })
        ));
    }
}
