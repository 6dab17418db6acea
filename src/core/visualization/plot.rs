// src/core/visualization/plot.rs
//
// Overview image: waveform on top, correlation curve below, one vertical
// marker per merged detection.

use anyhow::{bail, Result};
use image::{ImageBuffer, Rgb};
use std::path::Path;

use crate::detection::DetectionResult;

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 400,
        }
    }
}

const BACKGROUND: Rgb<u8> = Rgb([24, 24, 32]);
const AXIS: Rgb<u8> = Rgb([70, 70, 90]);
const WAVEFORM: Rgb<u8> = Rgb([90, 170, 230]);
const CORRELATION: Rgb<u8> = Rgb([235, 200, 60]);

/// Render `result` to a PNG (or any format `image` infers from the path).
pub fn render_overview(result: &DetectionResult, config: &PlotConfig, path: &Path) -> Result<()> {
    if config.width < 2 || config.height < 4 {
        bail!("plot size {}x{} is too small", config.width, config.height);
    }

    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(config.width, config.height, BACKGROUND);
    let half = config.height / 2;

    // Waveform is symmetric around its lane's midline
    draw_curve(&mut img, &result.waveform_data, 0, half, -1.0, 1.0, WAVEFORM);
    draw_curve(&mut img, &result.correlation_data, half, config.height, -1.0, 1.0, CORRELATION);
    for x in 0..config.width {
        img.put_pixel(x, half, AXIS);
    }

    if result.target_duration > 0.0 {
        for detection in &result.detections {
            let frac = (detection.time / result.target_duration).clamp(0.0, 1.0);
            let x = ((config.width - 1) as f64 * frac).round() as u32;
            let color = marker_color(detection.method_count);
            for y in 0..config.height {
                img.put_pixel(x, y, color);
            }
        }
    }

    img.save(path)?;
    log::debug!("overview written to {}", path.display());
    Ok(())
}

fn draw_curve(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    data: &[f32],
    top: u32,
    bottom: u32,
    min: f32,
    max: f32,
    color: Rgb<u8>,
) {
    if data.is_empty() || bottom <= top + 1 {
        return;
    }
    let width = img.width();
    let lane = (bottom - top - 1) as f32;
    let to_y = |v: f32| {
        let norm = ((v - min) / (max - min)).clamp(0.0, 1.0);
        top + (lane * (1.0 - norm)).round() as u32
    };

    let mut prev: Option<u32> = None;
    for x in 0..width {
        let idx = (x as usize * data.len() / width as usize).min(data.len() - 1);
        let y = to_y(data[idx]);
        // Connect to the previous column so steep slopes stay visible
        let (lo, hi) = match prev {
            Some(p) => (p.min(y), p.max(y)),
            None => (y, y),
        };
        for yy in lo..=hi {
            img.put_pixel(x, yy, color);
        }
        prev = Some(y);
    }
}

/// Greener the more methods agree
fn marker_color(method_count: usize) -> Rgb<u8> {
    match method_count {
        0 | 1 => Rgb([220, 80, 80]),
        2 => Rgb([230, 150, 60]),
        _ => Rgb([80, 220, 110]),
    }
}
