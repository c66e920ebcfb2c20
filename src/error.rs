//! 统一错误处理框架
//!
//! 核心算法只产生四类可恢复错误（参数、调用顺序、定义域、形状），
//! 其余变体仅由文件加载和并行调度等外围工具使用。

use std::fmt;
use std::io;
use thiserror::Error;

/// 通道耦合分析相关的统一错误类型
#[derive(Debug, Error)]
pub enum CouplingError {
    /// 参数非法（窗口宽度、阈值、空输入等）
    #[error("参数非法 / Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 在调用 `score` 之前请求了依赖评分结果的操作
    #[error("尚未计算评分，请先调用 score / No score computed, call score first")]
    NoScoreComputed,

    /// 对数运算遇到非正数
    #[error("定义域错误 / Domain error: {0}")]
    DomainError(String),

    /// 序列长度不一致或子区间越界
    #[error("形状不匹配 / Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// 文件I/O错误
    #[error("文件I/O错误 / I/O error: {0}")]
    IoError(#[from] io::Error),

    /// 矩阵文件格式错误
    #[error("文件格式错误 / Format error: {0}")]
    FormatError(String),

    /// 资源访问错误（线程池等）
    #[error("资源访问错误 / Resource error: {0}")]
    ResourceError(String),
}

impl From<serde_json::Error> for CouplingError {
    fn from(err: serde_json::Error) -> Self {
        CouplingError::FormatError(format!("JSON解析错误: {err}"))
    }
}

/// 通道耦合分析操作的标准Result类型
pub type CouplingResult<T> = Result<T, CouplingError>;

// ==================== 错误转换Helper函数 ====================

/// 创建参数错误的helper函数
#[inline]
pub fn invalid_parameter<E: fmt::Display>(context: &str, err: E) -> CouplingError {
    CouplingError::InvalidParameter(format!("{context}: {err}"))
}

/// 创建形状错误的helper函数
#[inline]
pub fn shape_mismatch<E: fmt::Display>(context: &str, err: E) -> CouplingError {
    CouplingError::ShapeMismatch(format!("{context}: {err}"))
}

/// 创建格式错误的helper函数
#[inline]
pub fn format_error<E: fmt::Display>(context: &str, err: E) -> CouplingError {
    CouplingError::FormatError(format!("{context}: {err}"))
}

// ==================== 错误分类系统 ====================
// 用于CLI退出码和批量处理中的错误统计

/// 错误类别枚举
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 调用方参数问题（窗口、阈值、子区间）
    Parameter,
    /// 调用顺序问题
    CallOrder,
    /// 数据本身的问题（定义域、形状、文件格式）
    Data,
    /// I/O相关错误
    Io,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从CouplingError提取错误类别
    pub fn from_coupling_error(e: &CouplingError) -> Self {
        match e {
            CouplingError::InvalidParameter(_) => Self::Parameter,
            CouplingError::NoScoreComputed => Self::CallOrder,
            CouplingError::DomainError(_)
            | CouplingError::ShapeMismatch(_)
            | CouplingError::FormatError(_) => Self::Data,
            CouplingError::IoError(_) => Self::Io,
            CouplingError::ResourceError(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Parameter => "参数错误",
            Self::CallOrder => "调用顺序错误",
            Self::Data => "数据错误",
            Self::Io => "I/O错误",
            Self::Other => "其他错误",
        }
    }
}
