//! # 来源模型
//!
//! 来源类型、来源标识和比较的左右两侧。
//!
//! ## 依赖关系
//! - 被 `models/entry.rs`, `parsers/`, `batch/` 使用
//! - 无外部模块依赖

use std::fmt;
use std::path::{Path, PathBuf};

/// 来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// Logiqx 风格的 XML dat 目录文件
    Dat,
    /// bencode 编码的 .torrent 元信息
    Torrent,
    /// qBittorrent / libtorrent 的 .fastresume 恢复数据
    QbFastresume,
    /// 本地目录
    Directory,
    /// archive.org 的 `<item>_files.xml` 索引
    ArchiveIndex,
    /// zip 压缩包（读取中央目录，不解压）
    Zip,
}

impl SourceType {
    /// 根据路径推断来源类型
    ///
    /// 目录优先；文件按扩展名判断。
    pub fn detect(path: &Path) -> Option<SourceType> {
        if path.is_dir() {
            return Some(SourceType::Directory);
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "torrent" => Some(SourceType::Torrent),
            "fastresume" => Some(SourceType::QbFastresume),
            "xml" => Some(SourceType::ArchiveIndex),
            "dat" => Some(SourceType::Dat),
            "zip" | "cbz" => Some(SourceType::Zip),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Dat => write!(f, "dat"),
            SourceType::Torrent => write!(f, "torrent"),
            SourceType::QbFastresume => write!(f, "qb-fastresume"),
            SourceType::Directory => write!(f, "directory"),
            SourceType::ArchiveIndex => write!(f, "archive-index"),
            SourceType::Zip => write!(f, "zip"),
        }
    }
}

/// 条目来源（仅用于诊断，不参与匹配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrigin {
    pub path: PathBuf,
    pub kind: SourceType,
}

impl SourceOrigin {
    pub fn new(path: impl Into<PathBuf>, kind: SourceType) -> Self {
        SourceOrigin {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.kind)
    }
}

/// 比较的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
