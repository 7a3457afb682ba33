//! # 日志初始化
//!
//! 使用 `tracing-subscriber` 输出结构化日志到 stderr，不与报告输出混合。
//!
//! 级别由 `-v` 次数决定：默认 warn，`-v` info，`-vv` debug，`-vvv` trace。
//! 设置 `RUST_LOG` 时以环境变量为准。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `tracing-subscriber`

use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// `-v` 次数对应的默认过滤级别
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// 初始化日志；重复调用会被忽略
pub fn init_logging(verbose: u8) {
    if LOGGING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_err()
    {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("filecmp={}", default_level(verbose))));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2);

    // 测试中可能已有全局 subscriber
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}
