//! 工具层集成测试
//!
//! 测试文件加载、单文件评分、批量扫描、JSON报告和峰值定位流程。


use das_coupling_tool::CouplingError;
use das_coupling_tool::core::{ChannelAxis, CorrelationMethod};
use das_coupling_tool::tools::{self, AppConfig, PeakConfig};
use matrix_fixtures::{coherent_then_noise, fixture_dir, log, write_csv, write_text};
use std::path::{Path, PathBuf};

fn base_config(input: &Path) -> AppConfig {
    AppConfig {
        input_path: input.to_path_buf(),
        window: 4,
        method: CorrelationMethod::Pearson,
        threshold: 0.5,
        channel_axis: ChannelAxis::Columns,
        threads: 1,
        bins: 10,
        output_path: None,
        verbose: false,
    }
}

fn peak_config(input: &Path) -> PeakConfig {
    PeakConfig {
        input_path: input.to_path_buf(),
        row: None,
        start: None,
        end: None,
        freq_axis: None,
        fmin: None,
        fmax: None,
        verbose: false,
    }
}

// ============================================================================
// 评分流程
// ============================================================================

#[test]
fn test_score_csv_file_end_to_end() {
    let dir = fixture_dir("score_csv_end_to_end");
    let path = write_csv(&dir, "scenario.csv", &coherent_then_noise(100, 10, 5));

    let config = base_config(&path);
    assert!(!config.is_batch_mode());

    let outcome = tools::process_matrix_file(&path, &config).unwrap();
    assert_eq!(outcome.path, path);
    assert_eq!(outcome.scores.quality().len(), 6);
    assert_eq!(outcome.bad_channels, vec![3, 4, 5]);
    assert_eq!(outcome.histogram.total(), 6);

    let report = tools::format_score_report(&outcome, &config);
    assert!(report.contains("BAD"));
    assert!(report.contains("Unscored tail: 6..10"));
    log("CSV端到端评分成功", "CSV end-to-end scoring succeeded");
}

#[test]
fn test_rows_axis_equals_transposed_columns() {
    let dir = fixture_dir("rows_axis");
    let data = coherent_then_noise(60, 8, 4);
    let by_columns = write_csv(&dir, "columns.csv", &data);
    let by_rows = write_csv(&dir, "rows.csv", &data.t().to_owned());

    let col_config = base_config(&by_columns);
    let row_config = AppConfig {
        channel_axis: ChannelAxis::Rows,
        ..base_config(&by_rows)
    };

    let a = tools::process_matrix_file(&by_columns, &col_config).unwrap();
    let b = tools::process_matrix_file(&by_rows, &row_config).unwrap();
    assert_eq!(a.scores.quality(), b.scores.quality());
}

#[test]
fn test_json_report_written() {
    let dir = fixture_dir("json_report");
    let path = write_csv(&dir, "scenario.csv", &coherent_then_noise(100, 10, 5));
    let report_path = dir.join("report.json");

    let config = AppConfig {
        method: CorrelationMethod::Spearman,
        output_path: Some(report_path.clone()),
        ..base_config(&path)
    };
    let outcome = tools::process_matrix_file(&path, &config).unwrap();
    tools::output_results(&outcome, &config).unwrap();

    let text = std::fs::read_to_string(&report_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["method"], "spearman");
    assert_eq!(json["window"], 4);
    assert_eq!(json["channel_count"], 10);
    assert_eq!(json["quality"].as_array().unwrap().len(), 6);
    assert_eq!(json["unscored_tail"]["start"], 6);
    assert_eq!(json["unscored_tail"]["end"], 10);
    assert_eq!(json["bad_channels"], serde_json::json!([3, 4, 5]));
}

#[test]
fn test_json_matrix_input_with_null() {
    let dir = fixture_dir("json_matrix");
    let path = write_text(
        &dir,
        "tiny.json",
        "[[1, 2, 3, 4], [2, 4, 6, 8], [3, null, 9, 12], [4, 8, 12, 16], [5, 10, 15, 20]]",
    );

    let config = AppConfig {
        window: 2,
        method: CorrelationMethod::Spearman,
        ..base_config(&path)
    };
    let outcome = tools::process_matrix_file(&path, &config).unwrap();
    assert_eq!(outcome.scores.quality().len(), 2);
    for &q in outcome.scores.quality() {
        assert!((q - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_window_larger_than_channels_fails() {
    let dir = fixture_dir("window_too_large");
    let path = write_csv(&dir, "small.csv", &coherent_then_noise(20, 3, 3));
    let config = base_config(&path);

    assert!(matches!(
        tools::process_matrix_file(&path, &config),
        Err(CouplingError::InvalidParameter(_))
    ));
}

#[test]
fn test_ragged_csv_is_shape_mismatch() {
    let dir = fixture_dir("ragged_csv");
    let path = write_text(&dir, "ragged.csv", "1,2,3\n4,5\n");
    assert!(matches!(
        tools::load_channel_matrix(&path, ChannelAxis::Columns),
        Err(CouplingError::ShapeMismatch(_))
    ));
}

#[test]
fn test_unsupported_extension_is_format_error() {
    let dir = fixture_dir("unsupported_ext");
    let path = write_text(&dir, "record.sgy", "1 2 3");
    assert!(matches!(
        tools::load_array(&path),
        Err(CouplingError::FormatError(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let path = PathBuf::from("tests/fixtures/definitely_missing.csv");
    assert!(matches!(
        tools::load_array(&path),
        Err(CouplingError::IoError(_))
    ));
}

// ============================================================================
// 批量模式
// ============================================================================

#[test]
fn test_batch_scan_and_partial_failure() {
    let dir = fixture_dir("batch_mode");
    write_csv(&dir, "a_good.csv", &coherent_then_noise(80, 9, 9));
    write_text(&dir, "b_broken.csv", "1,2\nx,y\n");
    write_text(&dir, "notes.md", "not a matrix");
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    write_csv(&dir.join("nested"), "skipped.csv", &coherent_then_noise(10, 4, 4));

    let files = tools::scan_matrix_files(&dir).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a_good.csv", "b_broken.csv"]);

    let report_path = dir.join("batch.json");
    let config = AppConfig {
        output_path: Some(report_path.clone()),
        ..base_config(&dir)
    };
    assert!(config.is_batch_mode());

    let outcomes = tools::process_batch(&config).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].bad_channels.is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn test_batch_all_failed_returns_error() {
    let dir = fixture_dir("batch_all_failed");
    write_text(&dir, "broken.txt", "abc\n");

    let result = tools::process_batch(&base_config(&dir));
    assert!(matches!(result, Err(CouplingError::FormatError(_))));
}

// ============================================================================
// 峰值定位
// ============================================================================

#[test]
fn test_locate_peaks_with_column_bounds() {
    let dir = fixture_dir("peaks_columns");
    let path = write_text(
        &dir,
        "spectrum.csv",
        "1,1,1,9,1,1,1,1\n1,1,1,1,1,7,1,1\n0.5,2,0.5,0.5,0.5,0.5,0.5,0.5\n",
    );

    let config = PeakConfig {
        start: Some(2),
        end: Some(7),
        ..peak_config(&path)
    };
    let hits = tools::locate_peaks(&config).unwrap();
    let columns: Vec<usize> = hits.iter().map(|h| h.column).collect();
    // 第2行峰值在区间外，区间内全部相等取首位
    assert_eq!(columns, vec![3, 5, 2]);
    assert!(hits.iter().all(|h| h.axis_value.is_none()));
}

#[test]
fn test_locate_peaks_with_frequency_axis() {
    let dir = fixture_dir("peaks_freq_axis");
    let spectrum = write_text(
        &dir,
        "spectrum.csv",
        "1,2,3,100,5,6,50,8,9,10\n",
    );
    let axis = write_text(&dir, "freqs.txt", "0 10 20 30 40 50 60 70 80 90\n");

    let config = PeakConfig {
        row: Some(0),
        freq_axis: Some(axis),
        fmin: Some(42.0),
        fmax: Some(88.0),
        ..peak_config(&spectrum)
    };
    let hits = tools::locate_peaks(&config).unwrap();
    // 42 Hz → 列4，88 Hz → 列9（含），区间 4..10 内峰值在列6
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].column, 6);
    assert_eq!(hits[0].axis_value, Some(60.0));

    let text = tools::format_peak_report(&spectrum, &hits);
    assert!(text.contains("60.000"));
}

#[test]
fn test_locate_peaks_axis_length_mismatch() {
    let dir = fixture_dir("peaks_axis_mismatch");
    let spectrum = write_text(&dir, "spectrum.csv", "1,2,3\n");
    let axis = write_text(&dir, "freqs.txt", "0 10\n");

    let config = PeakConfig {
        freq_axis: Some(axis),
        fmin: Some(0.0),
        fmax: Some(10.0),
        ..peak_config(&spectrum)
    };
    assert!(matches!(
        tools::locate_peaks(&config),
        Err(CouplingError::ShapeMismatch(_))
    ));
}
