//! # 统一文件记录
//!
//! 所有提取器产出的 `FileEntry`：一个来源中看到的一个逻辑文件。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `batch/`, `matcher/`, `commands/` 使用
//! - 使用 `models/hash.rs`, `models/source.rs`

use super::{FileHash, SourceOrigin};
use std::path::PathBuf;
use std::sync::Arc;

/// 一个来源中的一个逻辑文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// 相对来源根的路径分段（与平台无关）；空表示没有路径
    pub path: Vec<String>,

    /// 字节长度
    pub size: Option<u64>,

    /// 内容摘要
    pub hash: Option<FileHash>,

    /// 是否为目录条目（仅目录遍历在启用目录条目时产生）
    pub is_dir: bool,

    /// 磁盘上的绝对位置（目录遍历、fastresume）
    pub location: Option<PathBuf>,

    /// 产生该条目的来源
    pub origin: Arc<SourceOrigin>,
}

impl FileEntry {
    pub fn new(path: Vec<String>, origin: Arc<SourceOrigin>) -> Self {
        FileEntry {
            path,
            size: None,
            hash: None,
            is_dir: false,
            location: None,
            origin,
        }
    }

    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    pub fn with_hash(mut self, hash: Option<FileHash>) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn as_dir(mut self) -> Self {
        self.is_dir = true;
        self
    }

    /// 以 `/` 连接的相对路径；没有路径时为 `None`
    pub fn relpath(&self) -> Option<String> {
        if self.path.is_empty() {
            None
        } else {
            Some(self.path.join("/"))
        }
    }

    /// 用于显示的路径
    pub fn display_path(&self) -> String {
        self.relpath()
            .or_else(|| self.location.as_ref().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// 去掉前导路径分段
    ///
    /// 路径不以 `prefix` 开头时保持不变。
    pub fn strip_prefix(mut self, prefix: &[String]) -> Self {
        if !prefix.is_empty()
            && self.path.len() > prefix.len()
            && self.path[..prefix.len()] == *prefix
        {
            self.path.drain(..prefix.len());
        }
        self
    }
}

/// 将声明的路径字符串拆分为分段
///
/// 同时接受 `/` 和 `\` 分隔符，丢弃空分段和 `.`。
pub fn split_path(raw: &str) -> Vec<String> {
    raw.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .collect()
}
