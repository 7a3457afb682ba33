//! # 集合构建器
//!
//! 将一侧（left/right）的多个来源合并为一个有序集合。
//!
//! ## 功能
//! - 来源路径存在性检查（提取前）
//! - 按路径自动推断来源类型
//! - glob 通配符展开
//! - 多来源并行提取，按声明顺序合并
//! - 可选去除前导目录（`relative_to`）
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `parsers/` 提取条目
//! - 使用 `rayon` 并行提取, `glob` 展开路径

use crate::error::{CompareError, Result};
use crate::models::{split_path, FileEntry, Side, SourceType, Warning};
use crate::parsers::{self, ExtractOptions, Extraction};

use rayon::prelude::*;
use std::path::PathBuf;

/// 一个来源声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// 来源路径
    pub path: PathBuf,
    /// 来源类型；`None` 表示自动推断
    pub kind: Option<SourceType>,
    /// 需要去除的前导目录
    pub relative_to: Option<String>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceSpec {
            path: path.into(),
            kind: None,
            relative_to: None,
        }
    }

    pub fn with_kind(mut self, kind: Option<SourceType>) -> Self {
        self.kind = kind;
        self
    }

    pub fn relative_to(mut self, prefix: Option<String>) -> Self {
        self.relative_to = prefix;
        self
    }
}

/// 一侧的条目集合
#[derive(Debug)]
pub struct Collection {
    pub side: Side,
    /// 按来源顺序、来源内自然顺序排列
    pub entries: Vec<FileEntry>,
    /// 构建时产生的非致命警告
    pub warnings: Vec<Warning>,
}

impl Collection {
    pub fn new(side: Side, entries: Vec<FileEntry>) -> Self {
        Collection {
            side,
            entries,
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 集合构建器
pub struct CollectionBuilder {
    side: Side,
    sources: Vec<SourceSpec>,
}

impl CollectionBuilder {
    /// 创建新的集合构建器
    pub fn new(side: Side) -> Self {
        Self {
            side,
            sources: Vec::new(),
        }
    }

    /// 添加来源
    pub fn source(mut self, spec: SourceSpec) -> Self {
        self.sources.push(spec);
        self
    }

    /// 批量添加来源
    pub fn sources(mut self, specs: impl IntoIterator<Item = SourceSpec>) -> Self {
        self.sources.extend(specs);
        self
    }

    /// 检查所有来源存在并确定类型
    pub fn resolve(&self) -> Result<Vec<(SourceSpec, SourceType)>> {
        if self.sources.is_empty() {
            return Err(CompareError::InvalidArgument(format!(
                "no sources given for the {} side",
                self.side
            )));
        }

        // 先检查全部路径，再推断类型
        if let Some(missing) = self.sources.iter().find(|s| !s.path.exists()) {
            return Err(CompareError::SourceNotFound {
                path: missing.path.display().to_string(),
            });
        }

        self.sources
            .iter()
            .map(|spec| {
                let kind = match spec.kind {
                    Some(kind) => kind,
                    None => SourceType::detect(&spec.path).ok_or_else(|| {
                        CompareError::UnsupportedFormat(format!(
                            "Cannot determine source type for: {} (use --{}-type)",
                            spec.path.display(),
                            self.side
                        ))
                    })?,
                };
                Ok((spec.clone(), kind))
            })
            .collect()
    }

    /// 提取全部来源并合并
    pub fn build(&self, options: &ExtractOptions) -> Result<Collection> {
        let resolved = self.resolve()?;

        // rayon 的 collect 保持输入顺序
        let extractions: Vec<Result<Extraction>> = resolved
            .par_iter()
            .map(|(spec, kind)| -> Result<Extraction> {
                let mut extraction = parsers::extract(&spec.path, *kind, options)?;
                if let Some(prefix) = &spec.relative_to {
                    let prefix = split_path(prefix);
                    extraction.entries = extraction
                        .entries
                        .into_iter()
                        .map(|e| e.strip_prefix(&prefix))
                        .collect();
                }
                Ok(extraction)
            })
            .collect();

        let mut collection = Collection::new(self.side, Vec::new());
        for extraction in extractions {
            let extraction = extraction?;
            collection.entries.extend(extraction.entries);
            collection.warnings.extend(extraction.warnings);
        }

        tracing::info!(
            side = %self.side,
            sources = resolved.len(),
            entries = collection.len(),
            warnings = collection.warnings.len(),
            "collection built"
        );

        Ok(collection)
    }
}

/// 展开包含通配符的来源路径（按路径排序）
///
/// 不含通配符的路径原样返回；通配符没有匹配时报 `SourceNotFound`。
pub fn expand_source_paths(raw: &str) -> Result<Vec<PathBuf>> {
    if !raw.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(raw)]);
    }

    let paths = glob::glob(raw)
        .map_err(|e| CompareError::InvalidArgument(format!("invalid pattern '{}': {}", raw, e)))?;

    let mut matched: Vec<PathBuf> = paths.filter_map(|p| p.ok()).collect();
    matched.sort();

    if matched.is_empty() {
        return Err(CompareError::SourceNotFound {
            path: raw.to_string(),
        });
    }

    Ok(matched)
}
