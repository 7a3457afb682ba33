//! # 数据模型模块
//!
//! 定义所有提取器共享的统一文件记录模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `batch/`, `matcher/` 和 `commands/` 使用
//! - 子模块: entry, hash, source, warning

pub mod entry;
pub mod hash;
pub mod source;
pub mod warning;

pub use entry::{split_path, FileEntry};
pub use hash::{FileHash, HashAlgorithm};
pub use source::{Side, SourceOrigin, SourceType};
pub use warning::Warning;
