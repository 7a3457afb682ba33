//! # 目录遍历
//!
//! 递归遍历本地目录，每个普通文件产生一个条目。
//!
//! ## 功能
//! - 按文件名排序遍历，输出顺序稳定
//! - 可选输出目录条目
//! - 仅在需要时并行计算摘要；单个文件读取失败只产生警告
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `batch/runner.rs` 并行哈希, `utils/digest.rs`
//! - 使用 `walkdir` 遍历目录

use super::{Extraction, ExtractOptions};
use crate::batch::BatchRunner;
use crate::error::{CompareError, Result};
use crate::models::{FileEntry, SourceOrigin, Warning};
use crate::utils::{digest, progress};

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// 遍历目录
pub fn walk_directory(
    root: &Path,
    origin: Arc<SourceOrigin>,
    options: &ExtractOptions,
) -> Result<Extraction> {
    if !root.is_dir() {
        return Err(CompareError::SourceNotFound {
            path: root.display().to_string(),
        });
    }

    // 不解析符号链接，位置与种子恢复数据中按原样记录的保存路径一致
    let root = std::path::absolute(root).map_err(|e| CompareError::FileReadError {
        path: root.display().to_string(),
        source: e,
    })?;

    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let spinner = options
        .progress
        .then(|| progress::create_spinner(&format!("Walking {}", root.display())));

    for item in walker {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!("walk error under {}: {}", root.display(), e);
                warnings.push(Warning::WalkFailed {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Ok(relative) = item.path().strip_prefix(&root) else {
            continue;
        };
        let segments = relative_segments(relative);

        let file_type = item.file_type();
        if file_type.is_dir() {
            if options.include_dirs {
                entries.push(
                    FileEntry::new(segments, Arc::clone(&origin))
                        .with_location(item.path())
                        .as_dir(),
                );
            }
            continue;
        }
        if !file_type.is_file() {
            // 符号链接和特殊文件不计入
            continue;
        }

        match item.metadata() {
            Ok(meta) => entries.push(
                FileEntry::new(segments, Arc::clone(&origin))
                    .with_size(Some(meta.len()))
                    .with_location(item.path()),
            ),
            Err(e) => warnings.push(Warning::WalkFailed {
                path: Some(item.path().to_path_buf()),
                reason: e.to_string(),
            }),
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if options.compute_hashes {
        hash_entries(&mut entries, &mut warnings, options);
    }

    Ok(Extraction { entries, warnings })
}

/// 并行计算所有文件条目的摘要
fn hash_entries(entries: &mut [FileEntry], warnings: &mut Vec<Warning>, options: &ExtractOptions) {
    let targets: Vec<(usize, PathBuf)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_dir)
        .filter_map(|(i, e)| e.location.clone().map(|p| (i, p)))
        .collect();

    let runner = BatchRunner::new(options.jobs).with_progress(options.progress);
    let algorithm = options.algorithm;
    let (results, stats) = runner.run(&targets, "Hashing", |target: &(usize, PathBuf)| {
        digest::hash_file(&target.1, algorithm)
    });

    for ((index, path), result) in targets.into_iter().zip(results) {
        match result {
            Ok(hash) => entries[index].hash = Some(hash),
            Err(e) => {
                tracing::warn!("cannot hash {}: {}", path.display(), e);
                warnings.push(Warning::HashUnavailable {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        total = stats.total(),
        failed = stats.failed,
        "hashing finished"
    );
}

/// 相对路径转换为分段
fn relative_segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
