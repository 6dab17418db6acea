//! Digital signal processing utilities

mod fft;
mod peaks;
mod stats;
mod windows;

pub use fft::{correlate_same, cross_correlate, StftProcessor};
pub use peaks::{find_peaks, find_peaks_with_properties, Peak, PeakCriteria};
pub use stats::{all_finite, max_abs, mean_rows, normalize_by_peak, CURVE_EPSILON};
pub use windows::hann_window;
