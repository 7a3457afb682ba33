//! # zip 压缩包解析器
//!
//! 只读取中央目录，不解压任何内容。每个文件记录给出名称、解压后大小
//! 和 CRC32，因此只有选择 crc32 算法时条目才带摘要。
//!
//! `.cbz` 漫画包就是普通 zip，按同样方式处理。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `zip` 读取中央目录, `models/`

use super::ExtractOptions;
use crate::error::{CompareError, Result};
use crate::models::{split_path, FileEntry, FileHash, HashAlgorithm, SourceOrigin, SourceType};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

/// 列出 zip 压缩包中的条目
pub fn parse_zip_file(
    path: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Vec<FileEntry>> {
    let source = super::open_source(path)?;
    list_zip_reader(source, origin, options.algorithm, options.include_dirs)
        .map_err(|reason| CompareError::format(SourceType::Zip, path, reason))
}

/// 从读取器列出条目，顺序与中央目录一致
pub fn list_zip_reader<R: Read + Seek>(
    source: R,
    origin: Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
    include_dirs: bool,
) -> std::result::Result<Vec<FileEntry>, String> {
    let mut archive = ZipArchive::new(source).map_err(|e| e.to_string())?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let file = archive
            .by_index_raw(index)
            .map_err(|e| format!("entry #{}: {}", index, e))?;

        let segments = split_path(file.name());
        if segments.iter().any(|s| s == "..") {
            return Err(format!("entry '{}' escapes the archive root", file.name()));
        }
        if segments.is_empty() {
            continue;
        }

        if file.is_dir() {
            if include_dirs {
                entries.push(FileEntry::new(segments, Arc::clone(&origin)).as_dir());
            }
            continue;
        }

        let hash = match algorithm {
            HashAlgorithm::Crc32 => {
                FileHash::from_hex(HashAlgorithm::Crc32, &format!("{:08x}", file.crc32()))
            }
            _ => None,
        };
        entries.push(
            FileEntry::new(segments, Arc::clone(&origin))
                .with_size(Some(file.size()))
                .with_hash(hash),
        );
    }

    Ok(entries)
}
