//! # .torrent 元信息解析器
//!
//! 从 bencode 编码的 torrent 元信息中提取文件列表。
//!
//! ## 结构说明
//! ```text
//! 单文件:  info = { name, length, piece length, pieces }
//! 多文件:  info = { name, files: [{ length, path: [..] }, ..], .. }
//! v2:      info = { name, file tree: { dir: { file: { "": { length } } } } }
//! ```
//!
//! piece 哈希跨越多个文件，无法得到单文件摘要；只有 info 中附带的
//! 单文件 `sha1` / `md5sum` 字段才会被使用。BEP-47 填充文件会被跳过。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `parsers/fastresume.rs` 使用
//! - 使用 `parsers/bencode.rs`, `models/`

use super::bencode::{self, Value};
use super::ExtractOptions;
use crate::error::{CompareError, Result};
use crate::models::{FileEntry, FileHash, HashAlgorithm, SourceOrigin, SourceType};
use std::path::Path;
use std::sync::Arc;

/// info 字典中的单个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    /// 相对 torrent 根目录（不含 `name`）的路径分段
    pub path: Vec<String>,
    pub length: u64,
    pub hash: Option<FileHash>,
    /// BEP-47 填充文件
    pub padding: bool,
}

/// 解析后的 info 字典
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    pub name: String,
    /// 多文件 torrent 以 `name` 为顶层目录
    pub multi_file: bool,
    /// 按 info 中的顺序排列，包含填充文件以保持文件索引
    pub files: Vec<TorrentFile>,
}

impl TorrentInfo {
    /// 文件相对下载目录的完整路径分段
    pub fn full_path(&self, file: &TorrentFile) -> Vec<String> {
        if self.multi_file {
            std::iter::once(self.name.clone())
                .chain(file.path.iter().cloned())
                .collect()
        } else {
            vec![self.name.clone()]
        }
    }
}

/// 解析 .torrent 文件
pub fn parse_torrent_file(
    path: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Vec<FileEntry>> {
    let data = super::read_source(path)?;
    parse_torrent_bytes(&data, origin, options.algorithm)
        .map_err(|reason| CompareError::format(SourceType::Torrent, path, reason))
}

/// 从字节解析 torrent 元信息
pub fn parse_torrent_bytes(
    data: &[u8],
    origin: Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
) -> std::result::Result<Vec<FileEntry>, String> {
    let root = bencode::decode(data).map_err(|e| e.to_string())?;
    let info = root
        .get("info")
        .ok_or_else(|| "missing 'info' dictionary".to_string())?;
    let info = parse_info(info, algorithm)?;

    Ok(info
        .files
        .iter()
        .filter(|f| !f.padding)
        .map(|f| {
            FileEntry::new(info.full_path(f), Arc::clone(&origin))
                .with_size(Some(f.length))
                .with_hash(f.hash.clone())
        })
        .collect())
}

/// 解析 info 字典
pub fn parse_info(
    info: &Value<'_>,
    algorithm: HashAlgorithm,
) -> std::result::Result<TorrentInfo, String> {
    if info.as_dict().is_none() {
        return Err("'info' is not a dictionary".to_string());
    }

    let name = text_field(info, "name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "missing 'name' in info".to_string())?;
    if !is_safe_segment(&name) {
        return Err(format!("unsafe torrent name '{}'", name));
    }

    if let Some(files) = info.get("files") {
        let files = files
            .as_list()
            .ok_or_else(|| "'files' is not a list".to_string())?;
        let files = files
            .iter()
            .enumerate()
            .map(|(i, f)| parse_file(f, i, algorithm))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(TorrentInfo {
            name,
            multi_file: true,
            files,
        });
    }

    if let Some(length) = info.get("length") {
        let length = non_negative(length, "length")?;
        return Ok(TorrentInfo {
            name,
            multi_file: false,
            files: vec![TorrentFile {
                path: Vec::new(),
                length,
                hash: sidecar_hash(info, algorithm),
                padding: false,
            }],
        });
    }

    if let Some(tree) = info.get("file tree") {
        let mut files = Vec::new();
        walk_file_tree(tree, &mut Vec::new(), &mut files, 0)?;
        // v2 单文件 torrent 的文件树只有一个与 name 同名的叶子
        let single = files.len() == 1 && files[0].path == [name.clone()];
        if single {
            files[0].path.clear();
        }
        return Ok(TorrentInfo {
            name,
            multi_file: !single,
            files,
        });
    }

    Err("info has neither 'files', 'length' nor 'file tree'".to_string())
}

/// 解析 `files` 列表中的一项
fn parse_file(
    file: &Value<'_>,
    index: usize,
    algorithm: HashAlgorithm,
) -> std::result::Result<TorrentFile, String> {
    let length = file
        .get("length")
        .ok_or_else(|| format!("file #{} has no 'length'", index))
        .and_then(|l| non_negative(l, "length"))?;

    let segments = file
        .get("path.utf-8")
        .or_else(|| file.get("path"))
        .and_then(Value::as_list)
        .ok_or_else(|| format!("file #{} has no 'path' list", index))?;

    let path = segments
        .iter()
        .map(|s| {
            s.as_string()
                .ok_or_else(|| format!("file #{} has a non-string path segment", index))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if path.is_empty() {
        return Err(format!("file #{} has an empty path", index));
    }
    if let Some(bad) = path.iter().find(|s| !is_safe_segment(s)) {
        return Err(format!("file #{} has unsafe path segment '{}'", index, bad));
    }

    let padding = file
        .get("attr")
        .and_then(Value::as_bytes)
        .map(|attr| attr.contains(&b'p'))
        .unwrap_or(false)
        || path.last().is_some_and(|s| s.starts_with("_____padding_file_"));

    Ok(TorrentFile {
        path,
        length,
        hash: sidecar_hash(file, algorithm),
        padding,
    })
}

/// 递归遍历 v2 `file tree`
fn walk_file_tree(
    node: &Value<'_>,
    prefix: &mut Vec<String>,
    out: &mut Vec<TorrentFile>,
    depth: usize,
) -> std::result::Result<(), String> {
    const MAX_TREE_DEPTH: usize = 32;
    if depth > MAX_TREE_DEPTH {
        return Err("'file tree' nested too deep".to_string());
    }

    let dict = node
        .as_dict()
        .ok_or_else(|| "'file tree' node is not a dictionary".to_string())?;

    for (key, child) in dict {
        if key.is_empty() {
            // 叶子：空键下是文件属性
            let length = child
                .get("length")
                .ok_or_else(|| format!("'{}' has no 'length'", prefix.join("/")))
                .and_then(|l| non_negative(l, "length"))?;
            let padding = child
                .get("attr")
                .and_then(Value::as_bytes)
                .map(|attr| attr.contains(&b'p'))
                .unwrap_or(false);
            out.push(TorrentFile {
                path: prefix.clone(),
                length,
                hash: None,
                padding,
            });
            continue;
        }

        let segment = String::from_utf8_lossy(key).into_owned();
        if !is_safe_segment(&segment) {
            return Err(format!("unsafe path segment '{}'", segment));
        }
        prefix.push(segment);
        walk_file_tree(child, prefix, out, depth + 1)?;
        prefix.pop();
    }

    Ok(())
}

/// info 中附带的单文件摘要
fn sidecar_hash(dict: &Value<'_>, algorithm: HashAlgorithm) -> Option<FileHash> {
    match algorithm {
        HashAlgorithm::Sha1 => dict
            .get("sha1")
            .and_then(Value::as_bytes)
            .and_then(|raw| FileHash::from_bytes(HashAlgorithm::Sha1, raw)),
        HashAlgorithm::Md5 => dict
            .get("md5sum")
            .and_then(Value::as_string)
            .and_then(|hex| FileHash::from_hex(HashAlgorithm::Md5, &hex)),
        HashAlgorithm::Crc32 => None,
    }
}

/// 优先读取 `<key>.utf-8` 字段
fn text_field(dict: &Value<'_>, key: &str) -> Option<String> {
    dict.get(&format!("{}.utf-8", key))
        .or_else(|| dict.get(key))
        .and_then(Value::as_string)
}

fn non_negative(value: &Value<'_>, field: &str) -> std::result::Result<u64, String> {
    value
        .as_int()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| format!("'{}' is not a non-negative integer", field))
}

/// 拒绝 `..` 等可能逃逸下载目录的分段
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 测试用的最小 bencode 编码器
    pub(crate) fn bstr(s: &str) -> String {
        format!("{}:{}", s.len(), s)
    }

    /// 构造多文件 torrent
    pub(crate) fn multi_file_torrent(name: &str, files: &[(&str, u64)]) -> Vec<u8> {
        let mut list = String::from("l");
        for (path, length) in files {
            let segments: String = path.split('/').map(bstr).collect();
            list.push_str(&format!("d6:lengthi{}e4:pathl{}ee", length, segments));
        }
        list.push('e');
        format!(
            "d8:announce{}4:infod5:files{}4:name{}12:piece lengthi16384e6:pieces0:ee",
            bstr("http://tracker.example/announce"),
            list,
            bstr(name)
        )
        .into_bytes()
    }

    fn origin() -> Arc<SourceOrigin> {
        Arc::new(SourceOrigin::new("test.torrent", SourceType::Torrent))
    }

    #[test]
    fn test_single_file_torrent() {
        let data = b"d4:infod6:lengthi1024e4:name8:file.iso12:piece lengthi16384e6:pieces0:ee";
        let entries = parse_torrent_bytes(data, origin(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relpath().as_deref(), Some("file.iso"));
        assert_eq!(entries[0].size, Some(1024));
        assert!(entries[0].hash.is_none());
    }

    #[test]
    fn test_multi_file_torrent() {
        let data = multi_file_torrent("pack", &[("f1", 1), ("sub/f2", 2)]);
        let entries = parse_torrent_bytes(&data, origin(), HashAlgorithm::Sha1).unwrap();
        let paths: Vec<_> = entries.iter().filter_map(|e| e.relpath()).collect();
        assert_eq!(paths, vec!["pack/f1", "pack/sub/f2"]);
        assert_eq!(entries[1].size, Some(2));
    }

    #[test]
    fn test_padding_files_skipped() {
        let data = format!(
            "d4:infod5:filesld6:lengthi1e4:pathl{}eed4:attr1:p6:lengthi3e4:pathl{}eee4:name{}ee",
            bstr("a"),
            bstr(".pad"),
            bstr("pack")
        );
        let entries = parse_torrent_bytes(data.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relpath().as_deref(), Some("pack/a"));
    }

    #[test]
    fn test_sidecar_md5() {
        let md5 = "0123456789abcdef0123456789abcdef";
        let data = format!(
            "d4:infod6:lengthi5e6:md5sum{}4:name{}ee",
            bstr(md5),
            bstr("a.bin")
        );
        let entries = parse_torrent_bytes(data.as_bytes(), origin(), HashAlgorithm::Md5).unwrap();
        assert_eq!(entries[0].hash.as_ref().unwrap().digest, md5);

        // 其他算法不使用 md5sum
        let entries = parse_torrent_bytes(data.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap();
        assert!(entries[0].hash.is_none());
    }

    #[test]
    fn test_v2_file_tree() {
        let data = format!(
            "d4:infod9:file treed{}d{}d0:d6:lengthi7eeee{}d0:d6:lengthi9eeee4:name{}ee",
            bstr("dir"),
            bstr("x"),
            bstr("y"),
            bstr("pack")
        );
        let entries = parse_torrent_bytes(data.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap();
        let paths: Vec<_> = entries.iter().filter_map(|e| e.relpath()).collect();
        assert_eq!(paths, vec!["pack/dir/x", "pack/y"]);
    }

    #[test]
    fn test_missing_info() {
        let err =
            parse_torrent_bytes(b"d8:announce0:e", origin(), HashAlgorithm::Sha1).unwrap_err();
        assert!(err.contains("info"));
    }

    #[test]
    fn test_truncated_torrent() {
        let data = multi_file_torrent("pack", &[("f1", 1)]);
        let truncated = &data[..data.len() - 10];
        assert!(parse_torrent_bytes(truncated, origin(), HashAlgorithm::Sha1).is_err());
    }

    #[test]
    fn test_unsafe_path_rejected() {
        let data = multi_file_torrent("pack", &[("../escape", 1)]);
        let err = parse_torrent_bytes(&data, origin(), HashAlgorithm::Sha1).unwrap_err();
        assert!(err.contains("unsafe"));
    }

    #[test]
    fn test_parse_torrent_file_error_has_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.torrent");
        std::fs::write(&path, b"d4:info").unwrap();
        let err = parse_torrent_file(&path, origin(), &ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().contains("bad.torrent"));
        assert!(err.to_string().contains("torrent"));
    }
}
