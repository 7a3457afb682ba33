//! # 非致命警告
//!
//! 构建集合时可恢复的问题，随集合一起交给报告层显示。
//!
//! ## 依赖关系
//! - 被 `parsers/directory.rs`, `batch/collector.rs`, `commands/` 使用

use std::fmt;
use std::path::PathBuf;

/// 非致命警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// 目录遍历中的文件无法读取以计算摘要；该条目在按哈希比较时不可匹配
    HashUnavailable { path: PathBuf, reason: String },
    /// 目录遍历中无法访问的路径，已跳过
    WalkFailed { path: Option<PathBuf>, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::HashUnavailable { path, reason } => {
                write!(f, "Cannot hash {}: {}", path.display(), reason)
            }
            Warning::WalkFailed {
                path: Some(path),
                reason,
            } => write!(f, "Skipped {}: {}", path.display(), reason),
            Warning::WalkFailed { path: None, reason } => write!(f, "Walk error: {}", reason),
        }
    }
}
