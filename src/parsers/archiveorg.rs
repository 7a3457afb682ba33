//! # archive.org 文件索引解析器
//!
//! 解析 archive.org 条目的 `<identifier>_files.xml`（需事先下载）。
//!
//! ## 格式说明
//! ```text
//! <files>
//!   <file name="disc.iso" source="original">
//!     <mtime>1580780000</mtime>
//!     <size>1459978240</size>
//!     <md5>...</md5>
//!     <crc32>...</crc32>
//!     <sha1>...</sha1>
//!     <format>ISO Image</format>
//!   </file>
//!   <file name="disc_meta.xml" source="metadata">...</file>
//! </files>
//! ```
//!
//! 默认只保留 `source="original"` 的文件，并跳过 archive.org 自动生成的
//! 元数据、种子和缩略图格式。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `parsers/xml.rs`, `models/`

use super::{xml, ExtractOptions};
use crate::error::{CompareError, Result};
use crate::models::{split_path, FileEntry, FileHash, HashAlgorithm, SourceOrigin, SourceType};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// archive.org 自动生成、不属于原始内容的格式
const SKIP_FORMATS: &[&str] = &["Metadata", "Archive BitTorrent", "Item Tile"];

/// 解析 archive.org 文件索引
pub fn parse_archive_index(
    path: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Vec<FileEntry>> {
    let source = super::open_source(path)?;
    parse_archive_reader(source, origin, options.algorithm, options.include_derivatives)
        .map_err(|reason| CompareError::format(SourceType::ArchiveIndex, path, reason))
}

/// 正在读取的 `<file>` 元素
#[derive(Default)]
struct PendingFile {
    attrs: HashMap<String, String>,
    fields: HashMap<String, String>,
    current: Option<String>,
}

/// 从读取器解析索引内容
pub fn parse_archive_reader<R: BufRead>(
    source: R,
    origin: Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
    include_derivatives: bool,
) -> std::result::Result<Vec<FileEntry>, String> {
    let mut reader = xml::new_reader(source);
    let mut buf = Vec::new();
    let mut entries = Vec::new();

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut pending: Option<PendingFile> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("XML error at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = xml::start_name(e);

                if !root_seen {
                    if name != "files" {
                        return Err(format!(
                            "not an archive.org file index: unexpected root element <{}>",
                            name
                        ));
                    }
                    root_seen = true;
                } else if name == "file" {
                    let file = PendingFile {
                        attrs: xml::attributes(e)?,
                        ..PendingFile::default()
                    };
                    if is_empty {
                        finish_file(file, &origin, algorithm, include_derivatives, &mut entries)?;
                    } else {
                        pending = Some(file);
                    }
                } else if let Some(file) = pending.as_mut() {
                    if !is_empty {
                        file.current = Some(name);
                    }
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::Text(ref t) => {
                if let Some(file) = pending.as_mut() {
                    if let Some(field) = file.current.clone() {
                        let text = t
                            .unescape()
                            .map_err(|e| format!("invalid text in <{}>: {}", field, e))?;
                        file.fields.entry(field).or_default().push_str(&text);
                    }
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if xml::end_name(e) == "file" {
                    if let Some(file) = pending.take() {
                        finish_file(file, &origin, algorithm, include_derivatives, &mut entries)?;
                    }
                } else if let Some(file) = pending.as_mut() {
                    file.current = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if !root_seen {
        return Err("document has no root element".to_string());
    }
    if depth != 0 {
        return Err("unexpected end of document (unclosed elements)".to_string());
    }

    Ok(entries)
}

/// 完成一个 `<file>`：应用过滤并生成条目
fn finish_file(
    file: PendingFile,
    origin: &Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
    include_derivatives: bool,
    entries: &mut Vec<FileEntry>,
) -> std::result::Result<(), String> {
    let name = file
        .attrs
        .get("name")
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| "<file> without name".to_string())?;

    if !include_derivatives {
        if file.attrs.get("source").map(String::as_str) != Some("original") {
            return Ok(());
        }
        if let Some(format) = file.fields.get("format") {
            if SKIP_FORMATS.contains(&format.trim()) {
                return Ok(());
            }
        }
    }

    let size = xml::parse_size(file.fields.get("size").map(String::as_str), name)?;

    let hash = match file
        .fields
        .get(&algorithm.to_string())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        Some(raw) => Some(
            FileHash::from_hex(algorithm, raw)
                .ok_or_else(|| format!("invalid {} '{}' for file '{}'", algorithm, raw, name))?,
        ),
        None => None,
    };

    entries.push(
        FileEntry::new(split_path(name), Arc::clone(origin))
            .with_size(size)
            .with_hash(hash),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<files>
  <file name="Alpha (USA).iso" source="original">
    <mtime>1580780000</mtime>
    <size>1459978240</size>
    <md5>0123456789ABCDEF0123456789ABCDEF</md5>
    <crc32>1a2b3c4d</crc32>
    <sha1>1111111111111111111111111111111111111111</sha1>
    <format>ISO Image</format>
  </file>
  <file name="Gamma &amp; Delta/disc.iso" source="original">
    <size>42</size>
    <sha1>3333333333333333333333333333333333333333</sha1>
    <format>ISO Image</format>
  </file>
  <file name="item_meta.xml" source="original">
    <format>Metadata</format>
  </file>
  <file name="Alpha (USA).iso.png" source="derivative" original="Alpha (USA).iso">
    <format>PNG</format>
  </file>
  <file name="item_archive.torrent" source="metadata">
    <format>Archive BitTorrent</format>
  </file>
</files>
"#;

    fn origin() -> Arc<SourceOrigin> {
        Arc::new(SourceOrigin::new("item_files.xml", SourceType::ArchiveIndex))
    }

    #[test]
    fn test_parse_originals_only() {
        let entries =
            parse_archive_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Sha1, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].relpath().as_deref(), Some("Alpha (USA).iso"));
        assert_eq!(entries[0].size, Some(1459978240));
        assert_eq!(entries[1].path, vec!["Gamma & Delta", "disc.iso"]);
        assert_eq!(entries[1].size, Some(42));
    }

    #[test]
    fn test_include_derivatives() {
        let entries =
            parse_archive_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Sha1, true).unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries[2].size.is_none());
    }

    #[test]
    fn test_hash_selection() {
        let entries =
            parse_archive_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Md5, false).unwrap();
        let md5 = entries[0].hash.as_ref().unwrap();
        assert_eq!(md5.algorithm, HashAlgorithm::Md5);
        assert_eq!(md5.digest, "0123456789abcdef0123456789abcdef");
        assert!(entries[1].hash.is_none());

        let entries =
            parse_archive_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Crc32, false).unwrap();
        assert_eq!(entries[0].hash.as_ref().unwrap().digest, "1a2b3c4d");
    }

    #[test]
    fn test_invalid_size() {
        let content = r#"<files><file name="a" source="original"><size>n/a</size></file></files>"#;
        let err = parse_archive_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1, false)
            .unwrap_err();
        assert!(err.contains("invalid size"));
    }

    #[test]
    fn test_malformed_index() {
        let truncated = r#"<files><file name="a" source="original"><size>1</size>"#;
        assert!(
            parse_archive_reader(truncated.as_bytes(), origin(), HashAlgorithm::Sha1, false)
                .is_err()
        );

        let wrong_root = r#"<datafile></datafile>"#;
        assert!(
            parse_archive_reader(wrong_root.as_bytes(), origin(), HashAlgorithm::Sha1, false)
                .is_err()
        );
    }
}
