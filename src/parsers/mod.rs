//! # 来源解析器模块
//!
//! 将各种来源格式统一解析为 `FileEntry` 序列。
//!
//! ## 来源类型
//! - `dat`: Logiqx XML dat 目录文件
//! - `torrent`: .torrent 元信息
//! - `qb-fastresume`: qBittorrent 恢复数据
//! - `directory`: 本地目录递归遍历
//! - `archive-index`: archive.org 文件索引 XML
//! - `zip`: zip / cbz 压缩包中央目录
//!
//! ## 依赖关系
//! - 被 `batch/collector.rs` 和 `commands/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: bencode, xml, dat, torrent, fastresume, directory, archiveorg, zipfile

pub mod archiveorg;
pub mod bencode;
pub mod dat;
pub mod directory;
pub mod fastresume;
pub mod torrent;
mod xml;
pub mod zipfile;

use crate::error::{CompareError, Result};
use crate::models::{FileEntry, HashAlgorithm, SourceOrigin, SourceType, Warning};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// 提取选项
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// 从来源中选取（或计算）哪种摘要
    pub algorithm: HashAlgorithm,
    /// 目录遍历时是否计算文件摘要（仅按哈希比较时需要）
    pub compute_hashes: bool,
    /// 目录遍历时是否输出目录条目
    pub include_dirs: bool,
    /// archive.org 索引是否包含派生文件和元数据文件
    pub include_derivatives: bool,
    /// 摘要计算的并行作业数（0 = 全部 CPU）
    pub jobs: usize,
    /// 是否显示进度条
    pub progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            algorithm: HashAlgorithm::Sha1,
            compute_hashes: false,
            include_dirs: false,
            include_derivatives: false,
            jobs: 0,
            progress: false,
        }
    }
}

/// 单个来源的提取结果
#[derive(Debug, Default)]
pub struct Extraction {
    pub entries: Vec<FileEntry>,
    pub warnings: Vec<Warning>,
}

impl From<Vec<FileEntry>> for Extraction {
    fn from(entries: Vec<FileEntry>) -> Self {
        Extraction {
            entries,
            warnings: Vec::new(),
        }
    }
}

/// 按来源类型分派到对应的解析器
pub fn extract(path: &Path, kind: SourceType, options: &ExtractOptions) -> Result<Extraction> {
    let origin = Arc::new(SourceOrigin::new(path, kind));

    let extraction = match kind {
        SourceType::Dat => dat::parse_dat_file(path, origin, options)?.into(),
        SourceType::Torrent => torrent::parse_torrent_file(path, origin, options)?.into(),
        SourceType::QbFastresume => {
            fastresume::parse_fastresume_file(path, origin, options)?.into()
        }
        SourceType::Directory => directory::walk_directory(path, origin, options)?,
        SourceType::ArchiveIndex => archiveorg::parse_archive_index(path, origin, options)?.into(),
        SourceType::Zip => zipfile::parse_zip_file(path, origin, options)?.into(),
    };

    tracing::debug!(
        source = %path.display(),
        kind = %kind,
        entries = extraction.entries.len(),
        warnings = extraction.warnings.len(),
        "extracted source"
    );

    Ok(extraction)
}

/// 读取来源文件全部内容
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| io_error(path, e))
}

/// 打开来源文件用于流式解析
pub(crate) fn open_source(path: &Path) -> Result<io::BufReader<fs::File>> {
    fs::File::open(path)
        .map(io::BufReader::new)
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: io::Error) -> CompareError {
    if e.kind() == io::ErrorKind::NotFound {
        CompareError::SourceNotFound {
            path: path.display().to_string(),
        }
    } else {
        CompareError::FileReadError {
            path: path.display().to_string(),
            source: e,
        }
    }
}
