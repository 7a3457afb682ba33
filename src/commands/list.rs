//! # list 命令实现
//!
//! 提取一组来源并输出条目表格，或导出为 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/list.rs` 定义的参数
//! - 使用 `batch/`
//! - 使用 `utils/output.rs`, `csv`, `tabled`

use super::{print_warnings, side_builder};
use crate::cli::list::ListArgs;
use crate::error::{CompareError, Result};
use crate::models::{FileEntry, Side};
use crate::parsers::ExtractOptions;
use crate::utils::output;

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 导出的一行
#[derive(Debug, Serialize, Tabled)]
pub struct EntryRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Hash")]
    pub hash: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl From<&FileEntry> for EntryRow {
    fn from(entry: &FileEntry) -> Self {
        let mut path = entry.display_path();
        if entry.is_dir {
            path.push('/');
        }
        EntryRow {
            path,
            size: entry.size.map(|s| s.to_string()).unwrap_or_default(),
            hash: entry.hash.as_ref().map(|h| h.key()).unwrap_or_default(),
            location: entry
                .location
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            source: entry.origin.to_string(),
        }
    }
}

/// 执行 list 命令
pub fn execute(args: ListArgs) -> Result<()> {
    output::print_header("Listing Sources");

    let rels: Vec<String> = args.rel.iter().cloned().collect();
    let builder = side_builder(Side::Left, &args.paths, args.kind, &rels)?;

    let options = ExtractOptions {
        algorithm: args.hash.into(),
        compute_hashes: args.compute_hashes,
        include_dirs: args.dirs,
        include_derivatives: args.include_derivatives,
        jobs: args.jobs,
        progress: !args.no_progress,
    };

    let collection = builder.build(&options)?;
    print_warnings(&collection);

    let rows: Vec<EntryRow> = collection.entries.iter().map(EntryRow::from).collect();

    match &args.csv {
        Some(path) => {
            write_csv(&rows, path)?;
            output::print_success(&format!(
                "{} entries written to '{}'",
                rows.len(),
                path.display()
            ));
        }
        None => {
            println!("{}", Table::new(&rows));
            output::print_info(&format!("{} entries", rows.len()));
        }
    }

    Ok(())
}

/// 写出 CSV
fn write_csv(rows: &[EntryRow], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| CompareError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{split_path, FileHash, HashAlgorithm, SourceOrigin, SourceType};
    use std::sync::Arc;

    #[test]
    fn test_entry_row() {
        let entry = FileEntry::new(
            split_path("pack/f1"),
            Arc::new(SourceOrigin::new("a.torrent", SourceType::Torrent)),
        )
        .with_size(Some(12))
        .with_hash(FileHash::from_hex(HashAlgorithm::Crc32, "deadbeef"));

        let row = EntryRow::from(&entry);
        assert_eq!(row.path, "pack/f1");
        assert_eq!(row.size, "12");
        assert_eq!(row.hash, "crc32:deadbeef");
        assert_eq!(row.location, "");
        assert_eq!(row.source, "a.torrent (torrent)");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("entries.csv");
        let rows = vec![EntryRow {
            path: "a, b.iso".to_string(),
            size: "1".to_string(),
            hash: String::new(),
            location: String::new(),
            source: "set.dat (dat)".to_string(),
        }];

        write_csv(&rows, &out).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("path,size,hash,location,source"));
        assert_eq!(lines.next(), Some("\"a, b.iso\",1,,,set.dat (dat)"));
    }

    #[test]
    fn test_write_csv_to_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("entries.csv");
        assert!(write_csv(&[], &out).is_err());
    }
}
