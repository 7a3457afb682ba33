//! # compare 子命令 CLI 定义
//!
//! 比较左右两组来源，报告仅在一侧存在、两侧都有和无法比较的条目。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use super::{HashArg, KeyArg, SourceKind};
use clap::Args;

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    // ─────────────────────────────────────────────────────────────
    // 来源
    // ─────────────────────────────────────────────────────────────
    /// Left sources (files, directories or glob patterns)
    #[arg(short, long, num_args = 1.., required = true)]
    pub left: Vec<String>,

    /// Right sources (files, directories or glob patterns)
    #[arg(short, long, num_args = 1.., required = true)]
    pub right: Vec<String>,

    /// Force the source type of every left source (detected per path otherwise)
    #[arg(long, value_enum)]
    pub left_type: Option<SourceKind>,

    /// Force the source type of every right source (detected per path otherwise)
    #[arg(long, value_enum)]
    pub right_type: Option<SourceKind>,

    /// Leading directory to strip from left entries; one value, or one per --left source
    #[arg(long, num_args = 1..)]
    pub left_rel: Vec<String>,

    /// Leading directory to strip from right entries; one value, or one per --right source
    #[arg(long, num_args = 1..)]
    pub right_rel: Vec<String>,

    // ─────────────────────────────────────────────────────────────
    // 匹配
    // ─────────────────────────────────────────────────────────────
    /// Key used to decide whether two entries are the same file
    #[arg(long, value_enum, default_value = "relpath", env = "FILECMP_BY")]
    pub by: KeyArg,

    /// Hash algorithm used when comparing by hash or computing directory hashes
    #[arg(long, value_enum, default_value = "sha1", env = "FILECMP_HASH")]
    pub hash: HashArg,

    /// Compare path keys case-sensitively
    #[arg(long, conflicts_with = "ignore_case")]
    pub case_sensitive: bool,

    /// Compare path keys case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Include directory entries when walking directories
    #[arg(long)]
    pub dirs: bool,

    /// Keep derivative and metadata files from archive.org indexes
    #[arg(long)]
    pub include_derivatives: bool,

    /// Skip keys matching this regular expression (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub ignore: Vec<String>,

    // ─────────────────────────────────────────────────────────────
    // 报告
    // ─────────────────────────────────────────────────────────────
    /// Do not list left-only entries
    #[arg(long)]
    pub no_left: bool,

    /// Do not list right-only entries
    #[arg(long)]
    pub no_right: bool,

    /// Do not list entries present on both sides
    #[arg(long)]
    pub no_both: bool,

    /// Do not list unmatchable entries
    #[arg(long)]
    pub no_unmatchable: bool,

    /// List every contributing entry of duplicated keys, not just the first
    #[arg(long)]
    pub all_entries: bool,

    /// Among entries on both sides, only list pairs whose size or hash differ
    #[arg(long)]
    pub only_different: bool,

    // ─────────────────────────────────────────────────────────────
    // 执行
    // ─────────────────────────────────────────────────────────────
    /// Number of parallel hashing jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0, env = "FILECMP_JOBS")]
    pub jobs: usize,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
