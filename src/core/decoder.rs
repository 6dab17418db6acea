// src/core/decoder.rs
//
// Audio file decoding via Symphonia, plus the mono/resample step that turns
// a file into an analysis-ready signal.

use anyhow::{bail, Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::core::signal::AudioSignal;

/// Decoded file contents
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
    pub codec_name: String,
}

impl AudioData {
    /// Average the channels into one signal at the file's own rate
    pub fn to_mono(&self) -> AudioSignal {
        AudioSignal::from_interleaved(&self.samples, self.channels, self.sample_rate)
    }
}

/// Decode an audio file to floating-point samples
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe file format - may be corrupted or unsupported")?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("File does not specify sample rate")?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);
    if channels == 0 {
        bail!("File reports 0 audio channels");
    }
    let codec_name = format!("{:?}", track.codec_params.codec);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder for audio codec")?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        bail!("No audio samples decoded from {}", path.display());
    }

    let duration_secs = samples.len() as f64 / (sample_rate as f64 * channels as f64);
    log::debug!(
        "Decoded {}: {} Hz, {} ch, {:.2}s ({})",
        path.display(),
        sample_rate,
        channels,
        duration_secs,
        codec_name
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
        duration_secs,
        codec_name,
    })
}

/// Decode, downmix to mono and resample to `sample_rate`
pub fn load_signal(path: &Path, sample_rate: u32) -> Result<AudioSignal> {
    let audio = decode_audio(path)?;
    let mono = audio.to_mono();
    if mono.sample_rate() == sample_rate {
        return Ok(mono);
    }

    log::debug!(
        "Resampling {} from {} Hz to {} Hz",
        path.display(),
        mono.sample_rate(),
        sample_rate
    );
    let samples = resample(mono.samples(), mono.sample_rate(), sample_rate)
        .with_context(|| format!("Failed to resample {}", path.display()))?;
    Ok(AudioSignal::new(samples, sample_rate))
}

/// Band-limited sinc resampling of a mono buffer.
///
/// The filter delay is compensated, so the output is time-aligned with the
/// input and holds `round(len * to / from)` samples.
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
    if from == 0 || to == 0 {
        bail!("Cannot resample between {} Hz and {} Hz", from, to);
    }
    if samples.is_empty() || from == to {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to as f64 / from as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    // Trailing zeros flush the filter so the tail is not cut off
    let mut input = samples.to_vec();
    input.resize(samples.len() + params.sinc_len * 2, 0.0);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1)
        .context("Failed to create resampler")?;
    let delay = resampler.output_delay();
    let output = resampler
        .process(&[input], None)
        .context("Resampling failed")?;

    Ok(output
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .skip(delay)
        .take(expected)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgen::write_wav;
    use std::f32::consts::PI;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("audiomatchr-dec-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resample_length_and_level() {
        let from = 44100;
        let samples: Vec<f32> = (0..from)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / from as f32).sin())
            .collect();

        let out = resample(&samples, from as u32, 22050).unwrap();
        assert_eq!(out.len(), 22050);

        let peak = out[1000..21000].iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!((peak - 0.5).abs() < 0.05, "peak {}", peak);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 22050, 22050).unwrap(), samples);
        assert!(resample(&samples, 0, 22050).is_err());
    }

    #[test]
    fn test_decode_wav_round_trip() {
        let dir = temp_dir();
        let path = dir.join("tone.wav");
        let samples: Vec<f32> = (0..2205).map(|i| (i as f32 * 0.05).sin() * 0.25).collect();
        write_wav(&path, &samples, 22050).unwrap();

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), samples.len());
        assert!((audio.duration_secs - 0.1).abs() < 1e-9);
        assert!((audio.samples[100] - samples[100]).abs() < 1e-6);

        let signal = load_signal(&path, 22050).unwrap();
        assert_eq!(signal.len(), samples.len());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_errors() {
        let err = decode_audio(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
