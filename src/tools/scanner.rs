//! 文件扫描模块
//!
//! 负责扫描目录中的矩阵文件，用于批量评分模式。

use super::cli::AppConfig;
use super::loader::is_supported_matrix_file;
use super::utils;
use crate::error::{CouplingError, CouplingResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 扫描目录中的矩阵文件（不递归子目录，按路径排序）
pub fn scan_matrix_files(dir_path: &Path) -> CouplingResult<Vec<PathBuf>> {
    if !dir_path.exists() {
        return Err(CouplingError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("目录不存在: {}", dir_path.display()),
        )));
    }

    if !dir_path.is_dir() {
        return Err(CouplingError::InvalidParameter(format!(
            "路径不是目录: {}",
            dir_path.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir_path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| CouplingError::IoError(e.into()))?;
        let path = entry.path();

        if entry.file_type().is_file() && is_supported_matrix_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// 显示文件扫描结果
pub fn show_scan_results(config: &AppConfig, files: &[PathBuf]) {
    if files.is_empty() {
        println!(
            "⚠️  在目录 {} 中没有找到支持的矩阵文件",
            config.input_path.display()
        );
        println!("   支持的格式: CSV, TSV, TXT, JSON");
        return;
    }

    println!("📁 扫描目录: {}", config.input_path.display());
    println!("📈 找到 {} 个矩阵文件", files.len());

    if config.verbose {
        for (i, file) in files.iter().enumerate() {
            println!("   {}. {}", i + 1, utils::extract_filename_lossy(file));
        }
    }
    println!();
}
