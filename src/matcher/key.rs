//! # 匹配键
//!
//! 将条目投影为用于判等的字符串键。
//!
//! ## 依赖关系
//! - 被 `matcher/mod.rs` 使用
//! - 使用 `models/entry.rs`

use crate::models::FileEntry;
use std::fmt;
use std::path::Path;

/// 匹配键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// 带算法标签的内容摘要
    Hash,
    /// 规范化后的磁盘绝对路径
    AbsPath,
    /// 相对来源根的路径
    RelPath,
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::Hash => write!(f, "hash"),
            MatchKey::AbsPath => write!(f, "abspath"),
            MatchKey::RelPath => write!(f, "relpath"),
        }
    }
}

/// 匹配选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// 路径键是否忽略大小写
    pub case_insensitive: bool,
}

impl MatchOptions {
    /// 平台约定：Windows 与 macOS 的文件系统默认不区分大小写
    pub fn platform_default() -> Self {
        MatchOptions {
            case_insensitive: cfg!(any(windows, target_os = "macos")),
        }
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl MatchKey {
    /// 投影条目；缺少所需字段时返回 `None`（不可匹配）
    pub fn project(self, entry: &FileEntry, options: &MatchOptions) -> Option<String> {
        match self {
            MatchKey::Hash => entry.hash.as_ref().map(|h| h.key()),
            MatchKey::RelPath => entry.relpath().map(|p| fold_case(p, options)),
            MatchKey::AbsPath => entry
                .location
                .as_deref()
                .map(normalize_location)
                .map(|p| fold_case(p, options)),
        }
    }
}

fn fold_case(path: String, options: &MatchOptions) -> String {
    if options.case_insensitive {
        path.to_lowercase()
    } else {
        path
    }
}

/// 词法规范化绝对路径：统一分隔符为 `/`，消除 `.` 和 `..`
///
/// 不访问文件系统，符号链接不会被解析。
pub fn normalize_location(location: &Path) -> String {
    let raw = location.to_string_lossy().replace('\\', "/");
    let absolute = raw.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                // 不越过根或盘符
                if parts.last().is_some_and(|p| !p.ends_with(':')) {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
