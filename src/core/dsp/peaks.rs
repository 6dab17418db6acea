//! Peak picking on similarity curves
//!
//! Local maxima are filtered in a fixed order: height, separation,
//! prominence, then width. Separation keeps the taller of two peaks that are
//! closer than `distance` samples. On equal heights the later peak survives,
//! matching `scipy.signal.find_peaks`. Prominence is measured against the
//! lowest point on each side before the curve climbs above the peak again,
//! and width is measured at half that prominence with linear interpolation
//! between samples.

/// Constraints applied by [`find_peaks`]. `None` disables a filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    pub height: Option<f32>,
    pub prominence: Option<f32>,
    /// Minimum index distance between accepted peaks (1 disables)
    pub distance: usize,
    pub width: Option<f32>,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self {
            height: None,
            prominence: None,
            distance: 1,
            width: None,
        }
    }
}

/// An accepted local maximum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    /// Curve value at the peak; only reported when a height filter ran
    pub height: Option<f32>,
    pub prominence: Option<f32>,
    pub width: Option<f32>,
}

/// Find peaks in `signal`, returned in ascending index order.
pub fn find_peaks(signal: &[f32], criteria: &PeakCriteria) -> Vec<usize> {
    find_peaks_with_properties(signal, criteria)
        .into_iter()
        .map(|p| p.index)
        .collect()
}

/// Like [`find_peaks`] but keeps the measured properties of each peak.
pub fn find_peaks_with_properties(signal: &[f32], criteria: &PeakCriteria) -> Vec<Peak> {
    let mut peaks = local_maxima(signal);

    if let Some(min_height) = criteria.height {
        peaks.retain(|&i| signal[i] >= min_height);
    }

    if criteria.distance > 1 && peaks.len() > 1 {
        peaks = select_by_distance(signal, &peaks, criteria.distance);
    }

    let needs_bases = criteria.prominence.is_some() || criteria.width.is_some();
    let mut measured: Vec<(usize, Option<Prominence>)> = peaks
        .into_iter()
        .map(|i| (i, needs_bases.then(|| prominence(signal, i))))
        .collect();

    if let Some(min_prominence) = criteria.prominence {
        measured.retain(|(_, p)| p.map_or(false, |p| p.value >= min_prominence));
    }

    let mut result = Vec::with_capacity(measured.len());
    for (index, prom) in measured {
        let width = match (criteria.width, prom) {
            (Some(_), Some(p)) => Some(width_at_half_prominence(signal, index, &p)),
            _ => None,
        };
        if let (Some(min_width), Some(w)) = (criteria.width, width) {
            if w < min_width {
                continue;
            }
        }
        result.push(Peak {
            index,
            height: criteria.height.map(|_| signal[index]),
            prominence: criteria.prominence.and(prom.map(|p| p.value)),
            width,
        });
    }

    result
}

/// Strict local maxima. A flat top counts once, at its middle sample
/// (rounded down). The first and last samples are never peaks.
fn local_maxima(signal: &[f32]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right_edge = ahead - 1;
                peaks.push((i + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    peaks
}

fn select_by_distance(signal: &[f32], peaks: &[usize], distance: usize) -> Vec<usize> {
    // Tallest first; among equal heights the later index wins, as in scipy
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        signal[peaks[b]]
            .total_cmp(&signal[peaks[a]])
            .then(peaks[b].cmp(&peaks[a]))
    });

    let mut keep = vec![true; peaks.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let mut k = idx;
        while k > 0 && peaks[idx] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = idx + 1;
        while k < peaks.len() && peaks[k] - peaks[idx] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Prominence {
    value: f32,
    left_base: usize,
    right_base: usize,
}

fn prominence(signal: &[f32], peak: usize) -> Prominence {
    let top = signal[peak];

    let mut left_min = top;
    let mut left_base = peak;
    let mut i = peak as isize;
    while i >= 0 && signal[i as usize] <= top {
        if signal[i as usize] < left_min {
            left_min = signal[i as usize];
            left_base = i as usize;
        }
        i -= 1;
    }

    let mut right_min = top;
    let mut right_base = peak;
    let mut i = peak;
    while i < signal.len() && signal[i] <= top {
        if signal[i] < right_min {
            right_min = signal[i];
            right_base = i;
        }
        i += 1;
    }

    Prominence {
        value: top - left_min.max(right_min),
        left_base,
        right_base,
    }
}

fn width_at_half_prominence(signal: &[f32], peak: usize, prom: &Prominence) -> f32 {
    let level = signal[peak] - prom.value * 0.5;

    let mut i = peak;
    while prom.left_base < i && level < signal[i] {
        i -= 1;
    }
    let mut left = i as f32;
    if signal[i] < level {
        left += (level - signal[i]) / (signal[i + 1] - signal[i]);
    }

    let mut i = peak;
    while i < prom.right_base && level < signal[i] {
        i += 1;
    }
    let mut right = i as f32;
    if signal[i] < level {
        right -= (level - signal[i]) / (signal[i - 1] - signal[i]);
    }

    right - left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_skip_edges_and_center_plateaus() {
        let signal = [5.0, 1.0, 3.0, 3.0, 3.0, 0.0, 2.0, 4.0];
        assert_eq!(local_maxima(&signal), vec![3]);

        let even_plateau = [0.0, 2.0, 2.0, 0.0];
        assert_eq!(local_maxima(&even_plateau), vec![1]);
    }

    #[test]
    fn test_height_filter_reports_heights() {
        let signal = [0.0, 0.5, 0.0, 0.1, 0.0, 0.9, 0.0];
        let criteria = PeakCriteria {
            height: Some(0.2),
            ..Default::default()
        };
        let peaks = find_peaks_with_properties(&signal, &criteria);
        assert_eq!(peaks.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(peaks[1].height, Some(0.9));
    }

    #[test]
    fn test_without_height_filter_height_is_absent() {
        let peaks = find_peaks_with_properties(&[0.0, 1.0, 0.0], &PeakCriteria::default());
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].height, None);
    }

    #[test]
    fn test_distance_keeps_taller_peak() {
        let signal = [0.0, 0.6, 0.0, 1.0, 0.0, 0.7, 0.0, 0.0, 0.0, 0.8, 0.0];
        let criteria = PeakCriteria {
            distance: 3,
            ..Default::default()
        };
        // 1 and 5 are within 3 of the tallest (3); 9 is far enough away
        assert_eq!(find_peaks(&signal, &criteria), vec![3, 9]);
    }

    #[test]
    fn test_distance_tie_keeps_later_peak() {
        let signal = [0.0, 1.0, 0.0, 1.0, 0.0];
        let criteria = PeakCriteria {
            distance: 3,
            ..Default::default()
        };
        assert_eq!(find_peaks(&signal, &criteria), vec![3]);

        // A later tie only suppresses its own neighbours
        let chain = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&chain, &criteria), vec![1, 5]);
    }

    #[test]
    fn test_prominence_filters_shoulders() {
        // Small ripple at 3 rides on the flank of the main peak at 5
        let signal = [0.0, 0.2, 0.4, 0.5, 0.45, 1.0, 0.0];
        let criteria = PeakCriteria {
            prominence: Some(0.15),
            ..Default::default()
        };
        assert_eq!(find_peaks(&signal, &criteria), vec![5]);

        let props = find_peaks_with_properties(&signal, &criteria);
        assert!((props[0].prominence.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_width_filters_single_sample_spikes() {
        let mut signal = vec![0.0f32; 40];
        // Narrow spike: width at half prominence is 1 sample
        signal[10] = 1.0;
        // Broad triangle
        for (k, v) in [0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25].iter().enumerate() {
            signal[25 + k] = *v;
        }
        let criteria = PeakCriteria {
            width: Some(2.0),
            ..Default::default()
        };
        let peaks = find_peaks_with_properties(&signal, &criteria);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 28);
        assert!((peaks[0].width.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_short_signals_have_no_peaks() {
        assert!(find_peaks(&[], &PeakCriteria::default()).is_empty());
        assert!(find_peaks(&[1.0, 2.0], &PeakCriteria::default()).is_empty());
    }
}
