//! # 匹配模块
//!
//! 在选定匹配键下对左右两个集合做集合划分。
//!
//! ## 算法
//! 1. 每个条目投影为键；没有键的条目进入 `*_unmatchable`
//! 2. 每侧按键分组，保留首次出现顺序
//! 3. 两侧都有的键进入 `both`，其余进入 `left_only` / `right_only`
//!
//! 这是集合对账而非多重集差分：一个键在一侧出现多次、在另一侧出现
//! 至少一次，只形成一个 `both` 分组，所有来源条目都保留在分组中。
//! 多个 torrent 包含同一文件时尤其需要注意这一点。
//!
//! ## 输出顺序
//! `left_only` 与 `both` 按键在左侧集合中首次出现的顺序，
//! `right_only` 按右侧集合中首次出现的顺序。输入不变时输出完全一致。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `batch/collector.rs` 的 `Collection`, `models/`
//! - 子模块: key, diff

pub mod diff;
pub mod key;

pub use diff::{differences, Difference};
pub use key::{MatchKey, MatchOptions};

use crate::batch::Collection;
use crate::error::{CompareError, Result};
use crate::models::{FileEntry, HashAlgorithm};
use std::collections::{BTreeSet, HashMap};

/// 一侧中共享同一个键的条目
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: String,
    /// 按集合顺序排列，至少一个
    pub entries: Vec<&'a FileEntry>,
}

impl<'a> Group<'a> {
    /// 代表条目（首次出现）
    pub fn representative(&self) -> &'a FileEntry {
        self.entries[0]
    }

    /// 该键在本侧是否重复出现
    pub fn is_duplicated(&self) -> bool {
        self.entries.len() > 1
    }
}

/// 两侧共有的键
#[derive(Debug, Clone)]
pub struct Matched<'a> {
    pub key: String,
    pub left: Vec<&'a FileEntry>,
    pub right: Vec<&'a FileEntry>,
}

impl<'a> Matched<'a> {
    /// 代表条目对
    pub fn pair(&self) -> (&'a FileEntry, &'a FileEntry) {
        (self.left[0], self.right[0])
    }
}

/// 比较结果
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub key: MatchKey,
    pub left_only: Vec<Group<'a>>,
    pub right_only: Vec<Group<'a>>,
    pub both: Vec<Matched<'a>>,
    pub left_unmatchable: Vec<&'a FileEntry>,
    pub right_unmatchable: Vec<&'a FileEntry>,
}

impl<'a> Partition<'a> {
    /// 左侧重复出现的键数量
    pub fn left_duplicates(&self) -> usize {
        self.left_only.iter().filter(|g| g.is_duplicated()).count()
            + self.both.iter().filter(|m| m.left.len() > 1).count()
    }

    /// 右侧重复出现的键数量
    pub fn right_duplicates(&self) -> usize {
        self.right_only.iter().filter(|g| g.is_duplicated()).count()
            + self.both.iter().filter(|m| m.right.len() > 1).count()
    }
}

/// 按键分组，保留首次出现顺序
struct Grouping<'a> {
    index: HashMap<String, usize>,
    groups: Vec<Group<'a>>,
    unmatchable: Vec<&'a FileEntry>,
}

impl<'a> Grouping<'a> {
    fn build(entries: &'a [FileEntry], key: MatchKey, options: &MatchOptions) -> Self {
        let mut grouping = Grouping {
            index: HashMap::new(),
            groups: Vec::new(),
            unmatchable: Vec::new(),
        };

        for entry in entries {
            let Some(value) = key.project(entry, options) else {
                grouping.unmatchable.push(entry);
                continue;
            };

            match grouping.index.get(&value) {
                Some(&i) => grouping.groups[i].entries.push(entry),
                None => {
                    grouping.index.insert(value.clone(), grouping.groups.len());
                    grouping.groups.push(Group {
                        key: value,
                        entries: vec![entry],
                    });
                }
            }
        }

        grouping
    }
}

/// 比较两个集合
pub fn match_collections<'a>(
    left: &'a Collection,
    right: &'a Collection,
    key: MatchKey,
    options: &MatchOptions,
) -> Result<Partition<'a>> {
    if key == MatchKey::Hash {
        check_hash_algorithms(&left.entries, &right.entries)?;
    }

    let left_groups = Grouping::build(&left.entries, key, options);
    let right_groups = Grouping::build(&right.entries, key, options);

    let right_only = right_groups
        .groups
        .iter()
        .filter(|g| !left_groups.index.contains_key(&g.key))
        .cloned()
        .collect();

    let mut left_only = Vec::new();
    let mut both = Vec::new();
    for group in left_groups.groups {
        match right_groups.index.get(&group.key) {
            Some(&i) => both.push(Matched {
                key: group.key,
                left: group.entries,
                right: right_groups.groups[i].entries.clone(),
            }),
            None => left_only.push(group),
        }
    }

    let partition = Partition {
        key,
        left_only,
        right_only,
        both,
        left_unmatchable: left_groups.unmatchable,
        right_unmatchable: right_groups.unmatchable,
    };

    tracing::debug!(
        key = %key,
        left_only = partition.left_only.len(),
        right_only = partition.right_only.len(),
        both = partition.both.len(),
        left_unmatchable = partition.left_unmatchable.len(),
        right_unmatchable = partition.right_unmatchable.len(),
        "partition computed"
    );

    Ok(partition)
}

/// 两侧摘要必须来自同一种算法
fn check_hash_algorithms(left: &[FileEntry], right: &[FileEntry]) -> Result<()> {
    let algorithms = |entries: &[FileEntry]| -> BTreeSet<HashAlgorithm> {
        entries
            .iter()
            .filter_map(|e| e.hash.as_ref().map(|h| h.algorithm))
            .collect()
    };

    let l = algorithms(left);
    let r = algorithms(right);
    if l.is_empty() || r.is_empty() {
        return Ok(());
    }

    if l.len() > 1 || r.len() > 1 || l != r {
        let l: Vec<_> = l.into_iter().collect();
        let r: Vec<_> = r.into_iter().collect();
        return Err(CompareError::incompatible_hashes(&l, &r));
    }

    Ok(())
}
