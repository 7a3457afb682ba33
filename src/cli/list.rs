//! # list 子命令 CLI 定义
//!
//! 列出一组来源提取出的条目，可导出为 CSV。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/list.rs`

use super::{HashArg, SourceKind};
use clap::Args;
use std::path::PathBuf;

/// list 子命令参数
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Sources to list (files, directories or glob patterns)
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Force the source type (detected per path otherwise)
    #[arg(long = "type", value_enum)]
    pub kind: Option<SourceKind>,

    /// Leading directory to strip from entries
    #[arg(long)]
    pub rel: Option<String>,

    /// Hash algorithm to show
    #[arg(long, value_enum, default_value = "sha1", env = "FILECMP_HASH")]
    pub hash: HashArg,

    /// Hash files when walking directories
    #[arg(long)]
    pub compute_hashes: bool,

    /// Include directory entries when walking directories
    #[arg(long)]
    pub dirs: bool,

    /// Keep derivative and metadata files from archive.org indexes
    #[arg(long)]
    pub include_derivatives: bool,

    /// Write entries to this CSV file instead of printing a table
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Number of parallel hashing jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0, env = "FILECMP_JOBS")]
    pub jobs: usize,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
