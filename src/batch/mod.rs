//! # 批量处理模块
//!
//! 集合构建与并行执行。
//!
//! ## 功能
//! - 将一侧的多个来源合并为集合
//! - 来源类型自动检测与路径展开
//! - 并行处理与进度反馈
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `parsers/directory.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{expand_source_paths, Collection, CollectionBuilder, SourceSpec};
pub use runner::{BatchRunner, BatchStats};
