use peakscope::data::params::{PeakParams, RawPeakParams};
use peakscope::data::peaks::*;
use peakscope::PeakscopeError;
use serde_json::json;

fn peaks(values: &[f64], params: PeakParams) -> Vec<usize> {
    find_peaks(values, &params).unwrap()
}

fn raw(value: serde_json::Value) -> RawPeakParams {
    serde_json::from_value(value).unwrap()
}

#[test]
fn isolated_maxima_without_params() {
    let values = [1.0, 3.0, 1.0, 1.0, 3.0, 1.0];
    assert_eq!(peaks(&values, PeakParams::unconstrained()), vec![1, 4]);
}

#[test]
fn plateau_reports_its_midpoint() {
    let values = [1.0, 5.0, 5.0, 5.0, 1.0];
    assert_eq!(peaks(&values, PeakParams::unconstrained()), vec![2]);
}

#[test]
fn even_plateau_rounds_midpoint_down() {
    let values = [0.0, 2.0, 2.0, 0.0, 1.0, 4.0, 4.0, 4.0, 4.0, 1.0];
    // plateaus [1..=2] and [5..=8]
    assert_eq!(peaks(&values, PeakParams::unconstrained()), vec![1, 6]);
}

#[test]
fn plateau_at_the_edge_is_not_a_peak() {
    assert!(peaks(&[0.0, 3.0, 3.0], PeakParams::unconstrained()).is_empty());
    assert!(peaks(&[3.0, 3.0, 0.0], PeakParams::unconstrained()).is_empty());
    assert!(peaks(&[1.0, 1.0, 1.0, 1.0], PeakParams::unconstrained()).is_empty());
}

#[test]
fn plateau_rising_into_higher_neighbour_is_not_a_peak() {
    let values = [0.0, 2.0, 2.0, 3.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::unconstrained()), vec![3]);
}

#[test]
fn distance_prefers_higher_peak() {
    let values = [0.0, 5.0, 0.0, 3.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(3.0)), vec![1]);
}

#[test]
fn distance_keeps_peaks_exactly_distance_apart() {
    let values = [0.0, 5.0, 0.0, 3.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(2.0)), vec![1, 3]);
}

#[test]
fn distance_ties_go_to_lower_index() {
    let values = [0.0, 4.0, 0.0, 4.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(3.0)), vec![1]);
}

#[test]
fn distance_is_a_single_greedy_pass() {
    // 9 at index 3 suppresses both 7s; the 5 at index 7 is far enough from 9.
    let values = [0.0, 7.0, 0.0, 9.0, 0.0, 7.0, 0.0, 5.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(3.0)), vec![3, 7]);
}

#[test]
fn fractional_distance_rounds_nothing() {
    let values = [0.0, 5.0, 0.0, 3.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(2.5)), vec![1]);
}

#[test]
fn zero_distance_is_a_real_but_inert_constraint() {
    let values = [0.0, 5.0, 0.0, 3.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_distance(0.0)), vec![1, 3]);
}

#[test]
fn height_is_inclusive() {
    let values = [0.0, 2.0, 0.0, 3.0, 0.0, 1.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_height(2.0)), vec![1, 3]);
    assert_eq!(peaks(&values, PeakParams::default().with_height(2.5)), vec![3]);
}

#[test]
fn height_and_distance_combine() {
    let values = [0.0, 5.0, 0.0, 3.0, 0.0, 4.0, 0.0];
    assert_eq!(
        peaks(&values, PeakParams::default().with_height(3.5).with_distance(3.0)),
        vec![1, 5]
    );
    assert_eq!(
        peaks(&values, PeakParams::default().with_height(4.5).with_distance(3.0)),
        vec![1]
    );
}

#[test]
fn prominence_against_higher_neighbours() {
    let values = [0.0, 5.0, 1.0, 3.0, 2.0, 6.0, 0.0];
    assert_eq!(peak_prominence(&values, 1).prominence, 4.0);
    assert_eq!(
        peak_prominence(&values, 3),
        Prominence { prominence: 1.0, left_base: 2, right_base: 4 }
    );
    assert_eq!(
        peak_prominence(&values, 5),
        Prominence { prominence: 6.0, left_base: 0, right_base: 6 }
    );
    assert_eq!(peaks(&values, PeakParams::default().with_prominence(2.0)), vec![1, 5]);
    assert_eq!(peaks(&values, PeakParams::default().with_prominence(4.0)), vec![1, 5]);
    assert_eq!(peaks(&values, PeakParams::default().with_prominence(4.5)), vec![5]);
}

#[test]
fn prominence_uses_sequence_edge_as_wall() {
    // Left walk reaches index 0 without meeting anything higher; its lowest value is 1.
    let values = [3.0, 1.0, 4.0, 1.0, 0.0];
    let p = peak_prominence(&values, 2);
    assert_eq!(p.prominence, 3.0);
    assert_eq!(p.left_base, 1);
    assert_eq!(p.right_base, 4);
}

#[test]
fn prominence_next_to_the_edge() {
    let values = [1.0, 3.0, 2.0];
    let p = peak_prominence(&values, 1);
    assert_eq!(p.prominence, 1.0);
    assert_eq!((p.left_base, p.right_base), (0, 2));
}

#[test]
fn width_interpolates_half_prominence_crossings() {
    let values = [0.0, 1.0, 0.0];
    let p = peak_prominence(&values, 1);
    assert!((peak_width(&values, 1, &p) - 1.0).abs() < 1e-12);

    let values = [0.0, 2.0, 4.0, 2.0, 0.0];
    let p = peak_prominence(&values, 2);
    assert!((peak_width(&values, 2, &p) - 2.0).abs() < 1e-12);
}

#[test]
fn width_is_bounded_by_prominence_bases() {
    let values = [0.0, 5.0, 1.0, 3.0, 2.0, 6.0, 0.0];
    let widths: Vec<f64> = [1usize, 3, 5]
        .iter()
        .map(|&i| peak_width(&values, i, &peak_prominence(&values, i)))
        .collect();
    assert!((widths[0] - 0.9).abs() < 1e-12);
    assert!((widths[1] - 0.75).abs() < 1e-12);
    assert!((widths[2] - 1.25).abs() < 1e-12);

    assert_eq!(peaks(&values, PeakParams::default().with_width(0.8)), vec![1, 5]);
    assert_eq!(peaks(&values, PeakParams::default().with_width(1.0)), vec![5]);
    assert_eq!(peaks(&values, PeakParams::default().with_width(0.75)), vec![1, 3, 5]);
}

#[test]
fn width_filter_without_prominence_param() {
    let values = [0.0, 1.0, 0.0, 2.0, 4.0, 2.0, 0.0];
    assert_eq!(peaks(&values, PeakParams::default().with_width(1.5)), vec![4]);
}

#[test]
fn short_series_have_no_peaks() {
    for values in [&[][..], &[1.0][..], &[1.0, 2.0][..]] {
        assert!(peaks(values, PeakParams::unconstrained()).is_empty());
        assert!(peaks(values, PeakParams::default().with_height(0.0).with_width(1.0)).is_empty());
    }
}

#[test]
fn empty_series_ignores_params() {
    let out = find_peaks_raw(&[], &raw(json!({"height": "abc"}))).unwrap();
    assert!(out.is_empty());
}

#[test]
fn non_numeric_height_is_rejected() {
    let err = find_peaks_raw(&[1.0, 2.0, 3.0], &raw(json!({"height": "abc"}))).unwrap_err();
    match err {
        PeakscopeError::InvalidParameter { field, raw, .. } => {
            assert_eq!(field, "height");
            assert_eq!(raw, "abc");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn typed_params_are_validated_too() {
    let values = [0.0, 1.0, 0.0];
    for params in [
        PeakParams::default().with_height(f64::NAN),
        PeakParams::default().with_distance(-1.0),
        PeakParams::default().with_prominence(f64::INFINITY),
        PeakParams::default().with_width(-0.5),
    ] {
        let err = find_peaks(&values, &params).unwrap_err();
        assert!(matches!(err, PeakscopeError::InvalidParameter { .. }), "{err:?}");
    }
}

#[test]
fn string_params_are_accepted() {
    let values = [0.0, 2.0, 0.0, 3.0, 0.0];
    let out = find_peaks_raw(&values, &raw(json!({"height": "2.5", "distance": ""}))).unwrap();
    assert_eq!(out, vec![3]);
}

#[test]
fn nan_input_does_not_panic() {
    let values = [0.0, f64::NAN, 1.0, 0.0, 2.0, f64::NAN, 0.0];
    let params = PeakParams::default().with_distance(2.0).with_prominence(0.0).with_width(0.0);
    let out = find_peaks(&values, &params).unwrap();
    assert!(out.windows(2).all(|w| w[0] < w[1]));
}
