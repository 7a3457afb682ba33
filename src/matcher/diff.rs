//! # 匹配对差异检查
//!
//! 键相同的两个条目仍可能不同：按路径比较时大小或摘要不一致，
//! 或一侧是目录另一侧是文件。
//!
//! 大小相同但缺少可比摘要时，由调用方提供的 `digest` 按磁盘位置补算；
//! 本模块自身不做 I/O。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `models/`

use crate::models::{FileEntry, FileHash, HashAlgorithm};
use std::fmt;
use std::path::Path;

/// 匹配对之间的差异
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    /// 一侧是目录，另一侧是文件
    Kind { left_dir: bool, right_dir: bool },
    /// 大小不同
    Size { left: u64, right: u64 },
    /// 同算法摘要不同
    Hash { left: FileHash, right: FileHash },
    /// 大小相同，但至少一侧既没有摘要也无法读取内容
    Unverifiable,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::Kind { left_dir, .. } => {
                if *left_dir {
                    write!(f, "left is a directory, right is a file")
                } else {
                    write!(f, "left is a file, right is a directory")
                }
            }
            Difference::Size { left, right } => write!(f, "size different: {} vs {}", left, right),
            Difference::Hash { left, right } => write!(
                f,
                "{} different: {} vs {}",
                left.algorithm, left.digest, right.digest
            ),
            Difference::Unverifiable => write!(f, "no hash or location for same size files"),
        }
    }
}

/// 比较两个条目
///
/// 大小已不同时不再比较摘要；两侧都是空文件时视为相同。
/// 缺少同算法摘要时，对有 `location` 的一侧调用 `digest` 计算，
/// 算法取另一侧已有摘要的算法，两侧都没有时用 `fallback`。
pub fn differences<F>(
    left: &FileEntry,
    right: &FileEntry,
    fallback: HashAlgorithm,
    mut digest: F,
) -> Vec<Difference>
where
    F: FnMut(&Path, HashAlgorithm) -> Option<FileHash>,
{
    if left.is_dir != right.is_dir {
        return vec![Difference::Kind {
            left_dir: left.is_dir,
            right_dir: right.is_dir,
        }];
    }
    if left.is_dir {
        return Vec::new();
    }

    if let (Some(l), Some(r)) = (left.size, right.size) {
        if l != r {
            return vec![Difference::Size { left: l, right: r }];
        }
        if l == 0 {
            return Vec::new();
        }
    }

    let algorithm = match (&left.hash, &right.hash) {
        (Some(l), Some(r)) if l.algorithm == r.algorithm => l.algorithm,
        (Some(h), _) if right.location.is_some() => h.algorithm,
        (_, Some(h)) if left.location.is_some() => h.algorithm,
        _ => fallback,
    };

    let mut resolve = |entry: &FileEntry| -> Option<FileHash> {
        match &entry.hash {
            Some(h) if h.algorithm == algorithm => Some(h.clone()),
            _ => entry
                .location
                .as_deref()
                .and_then(|path| digest(path, algorithm)),
        }
    };

    match (resolve(left), resolve(right)) {
        (Some(l), Some(r)) if l.digest != r.digest => vec![Difference::Hash { left: l, right: r }],
        (Some(_), Some(_)) => Vec::new(),
        _ => vec![Difference::Unverifiable],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{split_path, SourceOrigin, SourceType};
    use std::sync::Arc;

    fn entry(size: Option<u64>, hash: Option<&str>) -> FileEntry {
        FileEntry::new(
            split_path("a.bin"),
            Arc::new(SourceOrigin::new("src", SourceType::Dat)),
        )
        .with_size(size)
        .with_hash(hash.and_then(|h| FileHash::from_hex(HashAlgorithm::Crc32, h)))
    }

    fn no_io(_: &Path, _: HashAlgorithm) -> Option<FileHash> {
        None
    }

    fn check(left: &FileEntry, right: &FileEntry) -> Vec<Difference> {
        differences(left, right, HashAlgorithm::Crc32, no_io)
    }

    #[test]
    fn test_identical() {
        let l = entry(Some(3), Some("deadbeef"));
        assert!(check(&l, &entry(Some(3), Some("deadbeef"))).is_empty());
    }

    #[test]
    fn test_size_difference_wins() {
        let diffs = check(&entry(Some(3), Some("deadbeef")), &entry(Some(4), Some("00000000")));
        assert_eq!(diffs, vec![Difference::Size { left: 3, right: 4 }]);
    }

    #[test]
    fn test_hash_difference() {
        let diffs = check(&entry(Some(3), Some("deadbeef")), &entry(None, Some("00000001")));
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].to_string().starts_with("crc32 different"));
    }

    #[test]
    fn test_empty_files_equal() {
        let l = entry(Some(0), Some("00000000"));
        assert!(check(&l, &entry(Some(0), Some("ffffffff"))).is_empty());
    }

    #[test]
    fn test_kind_difference() {
        let dir = entry(None, None).as_dir();
        let diffs = check(&dir, &entry(Some(1), None));
        assert!(matches!(
            diffs[0],
            Difference::Kind {
                left_dir: true,
                right_dir: false
            }
        ));
    }

    #[test]
    fn test_same_size_without_hash_or_location() {
        let diffs = check(&entry(Some(5), None), &entry(Some(5), Some("deadbeef")));
        assert_eq!(diffs, vec![Difference::Unverifiable]);
        assert_eq!(
            diffs[0].to_string(),
            "no hash or location for same size files"
        );
    }

    #[test]
    fn test_missing_hash_computed_from_location() {
        let hashed = entry(Some(5), Some("deadbeef"));
        let on_disk = entry(Some(5), None).with_location("/data/a.bin");

        let mut requested = Vec::new();
        let diffs = differences(&hashed, &on_disk, HashAlgorithm::Sha1, |path, algorithm| {
            requested.push((path.to_path_buf(), algorithm));
            FileHash::from_hex(algorithm, "00000001")
        });

        // 补算使用已有摘要的算法，而不是默认算法
        assert_eq!(
            requested,
            vec![(std::path::PathBuf::from("/data/a.bin"), HashAlgorithm::Crc32)]
        );
        assert!(matches!(diffs[..], [Difference::Hash { .. }]));

        let same = differences(&hashed, &on_disk, HashAlgorithm::Sha1, |_, algorithm| {
            FileHash::from_hex(algorithm, "deadbeef")
        });
        assert!(same.is_empty());
    }

    #[test]
    fn test_unreadable_location_is_unverifiable() {
        let l = entry(Some(5), None).with_location("/gone/a.bin");
        let r = entry(Some(5), None).with_location("/gone/b.bin");
        assert_eq!(check(&l, &r), vec![Difference::Unverifiable]);
    }
}
