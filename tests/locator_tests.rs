//! 数组特征定位测试
//!
//! 覆盖最近值查找的并列/越界策略和峰值定位的区间、定义域边界。


use das_coupling_tool::{CouplingError, nearest_index, peak_index};
use matrix_fixtures::{XorShift, log};
use ndarray::Array2;

// ========== nearest_index ==========

#[test]
fn test_nearest_round_trip_on_every_element() {
    let mut rng = XorShift::new(3);
    let mut seq: Vec<f64> = (0..257).map(|_| rng.next_signed() * 1000.0).collect();
    seq.sort_by(f64::total_cmp);
    seq.dedup();

    for (k, &v) in seq.iter().enumerate() {
        assert_eq!(nearest_index(&seq, v).unwrap(), k);
    }
}

#[test]
fn test_nearest_tie_resolves_left() {
    let seq = [1.0, 3.0, 5.0, 7.0, 9.0];
    // |6-5| == |6-7|，取左侧索引
    assert_eq!(nearest_index(&seq, 6.0).unwrap(), 2);
    assert_eq!(nearest_index(&seq, 2.0).unwrap(), 0);
    log("并列时取左侧索引", "Ties resolve to the left index");
}

#[test]
fn test_nearest_beyond_last_clamps() {
    let seq = [1.0, 3.0, 5.0, 7.0, 9.0];
    assert_eq!(nearest_index(&seq, 9.5).unwrap(), 4);
    assert_eq!(nearest_index(&seq, 1e9).unwrap(), 4);
    assert_eq!(nearest_index(&seq, -1e9).unwrap(), 0);
}

#[test]
fn test_nearest_single_element() {
    assert_eq!(nearest_index(&[4.2], -3.0).unwrap(), 0);
    assert_eq!(nearest_index(&[4.2], 30.0).unwrap(), 0);
}

#[test]
fn test_nearest_frequency_axis() {
    // 0.5 Hz 分辨率的频率轴
    let freqs: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
    assert_eq!(nearest_index(&freqs, 10.0).unwrap(), 20);
    assert_eq!(nearest_index(&freqs, 10.2).unwrap(), 20);
    assert_eq!(nearest_index(&freqs, 10.3).unwrap(), 21);
}

// ========== peak_index ==========

#[test]
fn test_peak_single_maximum_in_subrange() {
    let mut row = Array2::from_elem((1, 10), 1e-6);
    row[[0, 6]] = 5.0;
    assert_eq!(peak_index(row.view(), 0, 2, 9).unwrap(), 6);
}

#[test]
fn test_peak_zero_background_is_domain_error() {
    let mut row = Array2::<f64>::zeros((1, 10));
    row[[0, 6]] = 5.0;
    assert!(matches!(
        peak_index(row.view(), 0, 2, 9),
        Err(CouplingError::DomainError(_))
    ));
}

#[test]
fn test_peak_ignores_values_outside_range() {
    let mut spectrum = Array2::from_elem((3, 12), 1.0);
    spectrum[[1, 0]] = 1e6; // 区间外的更大值
    spectrum[[1, 8]] = 50.0;
    assert_eq!(peak_index(spectrum.view(), 1, 4, 12).unwrap(), 8);
}

#[test]
fn test_peak_every_position_recovered() {
    let cols = 16;
    for p in 3..11 {
        let mut spectrum = Array2::from_elem((2, cols), 0.5);
        spectrum[[1, p]] = 2.0;
        assert_eq!(peak_index(spectrum.view(), 1, 3, 11).unwrap(), p);
    }
}

#[test]
fn test_peak_ties_take_first_occurrence() {
    let mut spectrum = Array2::from_elem((1, 8), 1.0);
    spectrum[[0, 3]] = 9.0;
    spectrum[[0, 6]] = 9.0;
    assert_eq!(peak_index(spectrum.view(), 0, 0, 8).unwrap(), 3);
}

#[test]
fn test_peak_out_of_bounds() {
    let spectrum = Array2::from_elem((2, 5), 1.0);
    assert!(matches!(
        peak_index(spectrum.view(), 2, 0, 5),
        Err(CouplingError::ShapeMismatch(_))
    ));
    assert!(matches!(
        peak_index(spectrum.view(), 0, 1, 6),
        Err(CouplingError::ShapeMismatch(_))
    ));
    assert!(matches!(
        peak_index(spectrum.view(), 0, 3, 3),
        Err(CouplingError::InvalidParameter(_))
    ));
}
