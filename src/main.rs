//! # filecmp - 文件集合比较工具
//!
//! 从目录、torrent、qBittorrent 恢复数据、dat 目录文件、archive.org
//! 文件索引和 zip 压缩包中提取文件清单，比较左右两侧的差异。
//!
//! ## 子命令
//! - `compare` - 比较两组来源，报告仅在一侧存在的条目
//! - `list`    - 列出来源中的条目，可导出 CSV
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑与报告)
//!   │     ├── batch/     (集合构建、并行执行)
//!   │     ├── parsers/   (来源解析器)
//!   │     ├── matcher/   (匹配与划分)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、进度、日志、摘要)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod matcher;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::init_logging(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        tracing::debug!(error = ?e, "command failed");
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
