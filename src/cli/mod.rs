//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `compare`: 比较左右两组来源
//! - `list`: 列出来源中的条目
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: compare, list

pub mod compare;
pub mod list;

use crate::matcher::MatchKey;
use crate::models::{HashAlgorithm, SourceType};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// filecmp - 文件集合比较工具
#[derive(Parser)]
#[command(name = "filecmp")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Compare file listings from directories, torrents, qBittorrent resume data, dat files, \
             archive.org indexes and zip archives",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compare two groups of sources and report what is missing on each side
    Compare(compare::CompareArgs),

    /// List the entries extracted from one group of sources
    List(list::ListArgs),
}

// ─────────────────────────────────────────────────────────────
// 共用参数类型
// ─────────────────────────────────────────────────────────────

/// 来源类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SourceKind {
    /// Logiqx XML dat file
    Dat,
    /// .torrent metainfo
    Torrent,
    /// qBittorrent .fastresume file
    QbFastresume,
    /// Local directory tree
    Directory,
    /// archive.org <identifier>_files.xml
    ArchiveIndex,
    /// Zip archive, listed from its central directory
    Zip,
}

impl From<SourceKind> for SourceType {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Dat => SourceType::Dat,
            SourceKind::Torrent => SourceType::Torrent,
            SourceKind::QbFastresume => SourceType::QbFastresume,
            SourceKind::Directory => SourceType::Directory,
            SourceKind::ArchiveIndex => SourceType::ArchiveIndex,
            SourceKind::Zip => SourceType::Zip,
        }
    }
}

/// 匹配键
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum KeyArg {
    /// Content digest
    Hash,
    /// Absolute on-disk location
    Abspath,
    /// Path relative to the source root
    Relpath,
}

impl From<KeyArg> for MatchKey {
    fn from(key: KeyArg) -> Self {
        match key {
            KeyArg::Hash => MatchKey::Hash,
            KeyArg::Abspath => MatchKey::AbsPath,
            KeyArg::Relpath => MatchKey::RelPath,
        }
    }
}

/// 摘要算法
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum HashArg {
    Sha1,
    Md5,
    Crc32,
}

impl From<HashArg> for HashAlgorithm {
    fn from(hash: HashArg) -> Self {
        match hash {
            HashArg::Sha1 => HashAlgorithm::Sha1,
            HashArg::Md5 => HashAlgorithm::Md5,
            HashArg::Crc32 => HashAlgorithm::Crc32,
        }
    }
}
