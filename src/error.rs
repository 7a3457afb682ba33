//! # 统一错误处理模块
//!
//! 定义 filecmp 的所有错误类型，使用 `thiserror` 派生。
//!
//! 非致命问题（如目录遍历中单个文件无法读取）不属于错误，
//! 见 `models/warning.rs`。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 使用 `models/` 中的 `SourceType`, `HashAlgorithm` 作为错误上下文

use crate::models::{HashAlgorithm, SourceType};
use thiserror::Error;

/// filecmp 统一错误类型
#[derive(Error, Debug)]
pub enum CompareError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Source not found: {path}")]
    SourceNotFound { path: String },

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} source: {path}\nReason: {reason}")]
    FormatError {
        format: SourceType,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 匹配错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Cannot compare hashes across algorithms: left uses {left}, right uses {right}\n\
         Hint: pass the same --hash algorithm for both sides or compare by path"
    )]
    IncompatibleHashAlgorithm { left: String, right: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl CompareError {
    /// 构造格式错误
    pub fn format(format: SourceType, path: &std::path::Path, reason: impl Into<String>) -> Self {
        CompareError::FormatError {
            format,
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// 构造哈希算法不一致错误
    pub fn incompatible_hashes(left: &[HashAlgorithm], right: &[HashAlgorithm]) -> Self {
        let join = |algos: &[HashAlgorithm]| {
            algos
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join("+")
        };
        CompareError::IncompatibleHashAlgorithm {
            left: join(left),
            right: join(right),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CompareError>;
