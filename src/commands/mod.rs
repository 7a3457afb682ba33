//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `matcher/`, `utils/`
//! - 子模块: compare, list

pub mod compare;
pub mod list;

use crate::batch::{expand_source_paths, Collection, CollectionBuilder, SourceSpec};
use crate::cli::{Commands, SourceKind};
use crate::error::{CompareError, Result};
use crate::models::Side;
use crate::utils::output;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Compare(args) => compare::execute(args),
        Commands::List(args) => list::execute(args),
    }
}

/// 由命令行参数构造一侧的集合构建器
///
/// `raw` 中的每一项可以是通配符；`rels` 为空、只有一个值，或与 `raw` 一一对应。
pub(crate) fn side_builder(
    side: Side,
    raw: &[String],
    kind: Option<SourceKind>,
    rels: &[String],
) -> Result<CollectionBuilder> {
    let prefixes = relative_prefixes(side, rels, raw.len())?;

    let mut specs = Vec::new();
    for (pattern, prefix) in raw.iter().zip(prefixes) {
        for path in expand_source_paths(pattern)? {
            specs.push(
                SourceSpec::new(path)
                    .with_kind(kind.map(Into::into))
                    .relative_to(prefix.clone()),
            );
        }
    }

    Ok(CollectionBuilder::new(side).sources(specs))
}

fn relative_prefixes(side: Side, rels: &[String], count: usize) -> Result<Vec<Option<String>>> {
    match rels.len() {
        0 => Ok(vec![None; count]),
        1 => Ok(vec![Some(rels[0].clone()); count]),
        n if n == count => Ok(rels.iter().cloned().map(Some).collect()),
        n => Err(CompareError::InvalidArgument(format!(
            "--{}-rel takes one value or one per source ({} given for {} sources)",
            side, n, count
        ))),
    }
}

/// 显示集合构建时的警告
pub(crate) fn print_warnings(collection: &Collection) {
    for warning in &collection.warnings {
        output::print_warning(&format!("{}: {}", collection.side, warning));
    }
}
