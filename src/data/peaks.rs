//! Peak detection engine.
//!
//! Finds local maxima in a value sequence and narrows them down with the
//! optional constraints of [`PeakParams`], always in this order:
//! height, distance, prominence, width. Each filter only sees the survivors
//! of the previous one. The engine is a pure function of its inputs.

use std::collections::BTreeSet;

use log::debug;

use crate::data::params::{PeakParams, RawPeakParams};
use crate::error::Result;

/// Shortest sequence that can hold a peak (one sample plus two neighbours).
pub const MIN_SAMPLES: usize = 3;

/// Prominence of a peak together with the extent of the walk that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prominence {
    /// `value[peak] - max(left_min, right_min)`.
    pub prominence: f64,
    /// Index of the lowest sample between the peak and its left wall.
    pub left_base: usize,
    /// Index of the lowest sample between the peak and its right wall.
    pub right_base: usize,
}

/// Detect peaks in `values`, returning strictly increasing indices.
///
/// Sequences shorter than three samples have no peaks, whatever the parameters.
pub fn find_peaks(values: &[f64], params: &PeakParams) -> Result<Vec<usize>> {
    if values.len() < MIN_SAMPLES {
        return Ok(Vec::new());
    }
    params.validate()?;

    let mut peaks = local_maxima(values);
    let candidates = peaks.len();

    if let Some(height) = params.height {
        peaks.retain(|&i| values[i] >= height);
    }
    if let Some(distance) = params.distance {
        peaks = select_by_distance(values, &peaks, distance);
    }
    if params.prominence.is_some() || params.width.is_some() {
        let mut measured: Vec<(usize, Prominence)> = peaks
            .iter()
            .map(|&i| (i, peak_prominence(values, i)))
            .collect();
        if let Some(min_prominence) = params.prominence {
            measured.retain(|(_, p)| p.prominence >= min_prominence);
        }
        if let Some(min_width) = params.width {
            measured.retain(|(i, p)| peak_width(values, *i, p) >= min_width);
        }
        peaks = measured.into_iter().map(|(i, _)| i).collect();
    }

    debug!(
        "find_peaks: n={} candidates={} peaks={} params={:?}",
        values.len(),
        candidates,
        peaks.len(),
        params
    );
    Ok(peaks)
}

/// Same as [`find_peaks`], starting from parameters as a client sent them.
pub fn find_peaks_raw(values: &[f64], raw: &RawPeakParams) -> Result<Vec<usize>> {
    if values.len() < MIN_SAMPLES {
        return Ok(Vec::new());
    }
    find_peaks(values, &raw.parse()?)
}

/// All local maxima, in index order.
///
/// A flat plateau counts once, at its midpoint (rounded down), when both
/// samples bordering it are strictly lower. A plateau running into either end
/// of the sequence is not a peak.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < MIN_SAMPLES {
        return peaks;
    }
    let last = n - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Keep peaks at least `distance` indices apart, highest value first.
///
/// Ties in value go to the lower index. One greedy pass; the result is sorted
/// by index.
fn select_by_distance(values: &[f64], peaks: &[usize], distance: f64) -> Vec<usize> {
    let mut by_priority = peaks.to_vec();
    by_priority.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let far_enough = |a: usize, b: usize| (a.abs_diff(b) as f64) >= distance;
    let mut kept: BTreeSet<usize> = BTreeSet::new();
    for i in by_priority {
        let left_ok = kept.range(..i).next_back().map_or(true, |&j| far_enough(i, j));
        let right_ok = kept.range(i..).next().map_or(true, |&j| far_enough(i, j));
        if left_ok && right_ok {
            kept.insert(i);
        }
    }
    kept.into_iter().collect()
}

/// Prominence of the sample at `peak`.
///
/// Walks outwards on each side while samples do not exceed `values[peak]`,
/// stopping at the first higher sample or the end of the sequence. The lowest
/// sample seen on each side is that side's base.
///
/// # Panics
/// If `peak` is out of bounds.
pub fn peak_prominence(values: &[f64], peak: usize) -> Prominence {
    let top = values[peak];

    let (mut left_min, mut left_base) = (top, peak);
    for (j, &v) in values[..=peak].iter().enumerate().rev() {
        if v > top {
            break;
        }
        if v < left_min {
            left_min = v;
            left_base = j;
        }
    }

    let (mut right_min, mut right_base) = (top, peak);
    for (j, &v) in values.iter().enumerate().skip(peak) {
        if v > top {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    Prominence {
        prominence: top - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// Width of the peak at half its prominence, in (fractional) samples.
///
/// The crossings of `values[peak] - prominence / 2` are searched between the
/// prominence bases and interpolated linearly between neighbouring samples.
///
/// # Panics
/// If `peak` or the bases in `prominence` are out of bounds.
pub fn peak_width(values: &[f64], peak: usize, prominence: &Prominence) -> f64 {
    let level = values[peak] - prominence.prominence * 0.5;

    let mut i = peak;
    while prominence.left_base < i && level < values[i] {
        i -= 1;
    }
    let mut left = i as f64;
    if values[i] < level {
        left += (level - values[i]) / (values[i + 1] - values[i]);
    }

    let mut i = peak;
    while i < prominence.right_base && level < values[i] {
        i += 1;
    }
    let mut right = i as f64;
    if values[i] < level {
        right -= (level - values[i]) / (values[i - 1] - values[i]);
    }

    right - left
}
