//! # 工具函数模块
//!
//! 提供美化输出、进度条、日志初始化和文件摘要计算。
//!
//! ## 依赖关系
//! - 被 `commands/`, `parsers/`, `batch/` 使用
//! - 子模块: digest, logging, output, progress

pub mod digest;
pub mod logging;
pub mod output;
pub mod progress;
