//! # dat 目录文件解析器
//!
//! 解析 No-Intro / Redump 等使用的 Logiqx XML dat 格式（以及 MAME 的
//! `<machine>` 变体）。每个 `<rom>` 产生一个条目。
//!
//! ## dat 格式说明
//! ```text
//! <datafile>
//!   <header>...</header>
//!   <game name="Title (USA)">
//!     <rom name="Title (USA).iso" size="1459978240" crc="..." md5="..." sha1="..."/>
//!   </game>
//! </datafile>
//! ```
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

/// 可接受的根元素
const ROOT_ELEMENTS: &[&str] = &["datafile", "mame"];

/// 解析 dat 文件
pub fn parse_dat_file(
    path: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Vec<FileEntry>> {
    let source = super::open_source(path)?;
    parse_dat_reader(source, origin, options.algorithm)
        .map_err(|reason| CompareError::format(SourceType::Dat, path, reason))
}

/// 从读取器解析 dat 内容
pub fn parse_dat_reader<R: BufRead>(
    source: R,
    origin: Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
) -> std::result::Result<Vec<FileEntry>, String> {
    let mut reader = xml::new_reader(source);
    let mut buf = Vec::new();
    let mut entries = Vec::new();

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut game: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("XML error at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = xml::start_name(e);

                if !root_seen {
                    if !ROOT_ELEMENTS.contains(&name.as_str()) {
                        return Err(format!("not a dat file: unexpected root element <{}>", name));
                    }
                    root_seen = true;
                }

                match name.as_str() {
                    "game" | "machine" if !is_empty => {
                        let attrs = xml::attributes(e)?;
                        game = Some(attrs.get("name").cloned().unwrap_or_default());
                    }
                    "rom" => {
                        let game_name = game
                            .as_deref()
                            .ok_or_else(|| "<rom> outside of <game>".to_string())?;
                        let attrs = xml::attributes(e)?;
                        entries.push(rom_entry(&attrs, game_name, &origin, algorithm)?);
                    }
                    _ => {}
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if matches!(xml::end_name(e).as_str(), "game" | "machine") {
                    game = None;
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

/// 由 `<rom>` 属性构造条目
fn rom_entry(
    attrs: &HashMap<String, String>,
    game: &str,
    origin: &Arc<SourceOrigin>,
    algorithm: HashAlgorithm,
) -> std::result::Result<FileEntry, String> {
    let name = attrs
        .get("name")
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| format!("<rom> without name in game '{}'", game))?;

    let size = xml::parse_size(attrs.get("size").map(String::as_str), name)?;

    // dat 中 CRC32 属性名为 `crc`
    let attr = match algorithm {
        HashAlgorithm::Sha1 => "sha1",
        HashAlgorithm::Md5 => "md5",
        HashAlgorithm::Crc32 => "crc",
    };
    let hash = match attrs.get(attr).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            FileHash::from_hex(algorithm, raw)
                .ok_or_else(|| format!("invalid {} '{}' for rom '{}'", attr, raw, name))?,
        ),
        None => None,
    };

    Ok(FileEntry::new(split_path(name), Arc::clone(origin))
        .with_size(size)
        .with_hash(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile PUBLIC "-//Logiqx//DTD ROM Management Datafile//EN" "http://www.logiqx.com/Dats/datafile.dtd">
<datafile>
    <header>
        <name>Nintendo - GameCube</name>
        <version>2020-02-04 03-16-06</version>
    </header>
    <game name="Alpha (USA)">
        <description>Alpha (USA)</description>
        <rom name="Alpha (USA).iso" size="1459978240" crc="1a2b3c4d" md5="0123456789abcdef0123456789abcdef" sha1="1111111111111111111111111111111111111111"/>
    </game>
    <game name="Beta (Japan)">
        <description>Beta &amp; Friends (Japan)</description>
        <rom name="Beta (Japan)\disc1.iso" size="100" crc="ABCDEF01" sha1="2222222222222222222222222222222222222222"/>
        <rom name="Beta (Japan)\disc2.iso" size="200" status="nodump"/>
    </game>
</datafile>
"#;

    fn origin() -> Arc<SourceOrigin> {
        Arc::new(SourceOrigin::new("test.dat", SourceType::Dat))
    }

    #[test]
    fn test_parse_dat_basic() {
        let entries = parse_dat_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].relpath().as_deref(), Some("Alpha (USA).iso"));
        assert_eq!(entries[0].size, Some(1459978240));
        assert_eq!(
            entries[0].hash.as_ref().unwrap().digest,
            "1111111111111111111111111111111111111111"
        );

        // 反斜杠路径被拆分为分段
        assert_eq!(entries[1].path, vec!["Beta (Japan)", "disc1.iso"]);

        // nodump 条目没有摘要
        assert_eq!(entries[2].size, Some(200));
        assert!(entries[2].hash.is_none());
    }

    #[test]
    fn test_parse_dat_selects_algorithm() {
        let entries = parse_dat_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Crc32).unwrap();
        let crc = entries[1].hash.as_ref().unwrap();
        assert_eq!(crc.algorithm, HashAlgorithm::Crc32);
        assert_eq!(crc.digest, "abcdef01");

        let entries = parse_dat_reader(SAMPLE.as_bytes(), origin(), HashAlgorithm::Md5).unwrap();
        assert!(entries[0].hash.is_some());
        assert!(entries[1].hash.is_none());
    }

    #[test]
    fn test_parse_mame_machine() {
        let content = r#"<mame build="0.250"><machine name="pacman"><rom name="pacman.6e" size="4096" crc="c1e6ab10" sha1="e87e059c5be45753f7e9f33dff851f16d6751181"/></machine></mame>"#;
        let entries = parse_dat_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relpath().as_deref(), Some("pacman.6e"));
    }

    #[test]
    fn test_rom_without_name() {
        let content = r#"<datafile><game name="x"><rom size="1"/></game></datafile>"#;
        let err = parse_dat_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap_err();
        assert!(err.contains("without name"));
    }

    #[test]
    fn test_invalid_size_and_hash() {
        let content = r#"<datafile><game name="x"><rom name="a" size="big"/></game></datafile>"#;
        assert!(parse_dat_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1).is_err());

        let content = r#"<datafile><game name="x"><rom name="a" sha1="nothex"/></game></datafile>"#;
        assert!(parse_dat_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1).is_err());
    }

    #[test]
    fn test_malformed_xml() {
        let mismatched = r#"<datafile><game name="x"></datafile>"#;
        assert!(parse_dat_reader(mismatched.as_bytes(), origin(), HashAlgorithm::Sha1).is_err());

        let truncated = r#"<datafile><game name="x"><rom name="a" size="1"/>"#;
        let err =
            parse_dat_reader(truncated.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap_err();
        assert!(err.contains("unexpected end"));

        assert!(parse_dat_reader("".as_bytes(), origin(), HashAlgorithm::Sha1).is_err());
    }

    #[test]
    fn test_wrong_root() {
        let content = r#"<files><file name="a"/></files>"#;
        let err = parse_dat_reader(content.as_bytes(), origin(), HashAlgorithm::Sha1).unwrap_err();
        assert!(err.contains("not a dat file"));
    }

    #[test]
    fn test_parse_dat_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dat");
        std::fs::write(&path, "<datafile><game>").unwrap();

        let err = parse_dat_file(&path, origin(), &ExtractOptions::default()).unwrap_err();
        match err {
            CompareError::FormatError { format, path: p, .. } => {
                assert_eq!(format, SourceType::Dat);
                assert!(p.ends_with("broken.dat"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
