//! # qBittorrent .fastresume 解析器
//!
//! 解析 libtorrent 恢复数据，得到 torrent 在磁盘上的实际布局。
//!
//! ## 结构说明
//! ```text
//! save_path      下载目录（旧版本为 qBt-savePath）
//! info           内嵌的 info 字典（可选）
//! mapped_files   重命名后的文件路径列表，按文件索引对应（可选）
//! ```
//!
//! 没有内嵌 info 时，从同目录下同名的 `.torrent` 读取
//! （qBittorrent 的 `BT_backup` 目录就是这样存放的）。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `parsers/bencode.rs`, `parsers/torrent.rs`, `models/`

use super::bencode::{self, Value};
use super::torrent::{self, TorrentInfo};
use super::ExtractOptions;
use crate::error::{CompareError, Result};
use crate::models::{split_path, FileEntry, HashAlgorithm, SourceOrigin, SourceType};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 解析 .fastresume 文件
pub fn parse_fastresume_file(
    path: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Vec<FileEntry>> {
    let data = super::read_source(path)?;
    let resume = bencode::decode(&data)
        .map_err(|e| CompareError::format(SourceType::QbFastresume, path, e.to_string()))?;

    // 内嵌 info 优先，否则读取同名 .torrent
    let sidecar;
    let sidecar_root;
    let info = match resume.get("info") {
        Some(info) => info,
        None => {
            let torrent_path = path.with_extension("torrent");
            if !torrent_path.is_file() {
                return Err(CompareError::format(
                    SourceType::QbFastresume,
                    path,
                    format!(
                        "no embedded 'info' and no sibling torrent at {}",
                        torrent_path.display()
                    ),
                ));
            }
            sidecar = super::read_source(&torrent_path)?;
            let invalid = |reason: String| {
                CompareError::format(SourceType::Torrent, &torrent_path, reason)
            };
            sidecar_root = bencode::decode(&sidecar).map_err(|e| invalid(e.to_string()))?;
            sidecar_root
                .get("info")
                .ok_or_else(|| invalid("missing 'info' dictionary".to_string()))?
        }
    };

    entries_from_resume(&resume, info, origin, options.algorithm)
        .map_err(|reason| CompareError::format(SourceType::QbFastresume, path, reason))
}

/// 根据恢复数据和 info 字典生成条目
pub fn entries_from_resume(
    resume: &Value<'_>,
    info: &Value<'_>,
    origin: Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
) -> std::result::Result<Vec<FileEntry>, String> {
    if resume.as_dict().is_none() {
        return Err("resume data is not a dictionary".to_string());
    }

    let save_path = resume
        .get("save_path")
        .or_else(|| resume.get("qBt-savePath"))
        .and_then(Value::as_string)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| "missing 'save_path'".to_string())?;
    let save_path = PathBuf::from(save_path);

    let info: TorrentInfo = torrent::parse_info(info, algorithm)?;
    let mapped = mapped_files(resume)?;

    let mut entries = Vec::with_capacity(info.files.len());
    for (index, file) in info.files.iter().enumerate() {
        if file.padding {
            continue;
        }

        let path = match mapped.get(index).and_then(|m| m.as_ref()) {
            Some(renamed) => renamed.clone(),
            None => info.full_path(file),
        };

        let location = path.iter().fold(save_path.clone(), |acc, s| acc.join(s));
        entries.push(
            FileEntry::new(path, Arc::clone(&origin))
                .with_size(Some(file.length))
                .with_hash(file.hash.clone())
                .with_location(location),
        );
    }

    Ok(entries)
}

/// 读取 `mapped_files`，空字符串表示未重命名
fn mapped_files(resume: &Value<'_>) -> std::result::Result<Vec<Option<Vec<String>>>, String> {
    let Some(list) = resume.get("mapped_files") else {
        return Ok(Vec::new());
    };

    let list = list
        .as_list()
        .ok_or_else(|| "'mapped_files' is not a list".to_string())?;

    list.iter()
        .map(|item| {
            let raw = item
                .as_string()
                .ok_or_else(|| "'mapped_files' contains a non-string item".to_string())?;
            let segments = split_path(&raw);
            if segments.iter().any(|s| s == "..") {
                return Err(format!("unsafe mapped path '{}'", raw));
            }
            Ok((!segments.is_empty()).then_some(segments))
        })
        .collect()
}
