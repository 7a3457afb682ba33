//! # compare 命令实现
//!
//! 构建左右集合、匹配并输出报告。
//!
//! ## 报告格式
//! ```text
//! lo: only/on/left.iso        (仅左侧)
//! ro: only/on/right.iso       (仅右侧)
//! bo: on/both.iso             (两侧都有)
//!     size different: 10 vs 12
//! bo: same/size.iso
//!     crc32 different: 1a2b3c4d vs 00000000
//! lu: left/without/key.iso    (左侧不可匹配)
//! ru: right/without/key.iso   (右侧不可匹配)
//! ```
//! 大小相同但缺少可比摘要的匹配对，按磁盘位置补算摘要后再比较。
//! 最后输出各分区数量的汇总表。
//!
//! ## 依赖关系
//! - 使用 `cli/compare.rs` 定义的参数
//! - 使用 `batch/`, `matcher/`
//! - 使用 `utils/output.rs`, `utils/digest.rs`

use super::{print_warnings, side_builder};
use crate::batch::BatchRunner;
use crate::cli::compare::CompareArgs;
use crate::error::{CompareError, Result};
use crate::matcher::{self, differences, Difference, MatchKey, MatchOptions, Matched, Partition};
use crate::models::{FileEntry, FileHash, HashAlgorithm, Side};
use crate::parsers::ExtractOptions;
use crate::utils::{digest, output};

use colored::Color;
use regex::Regex;
use std::convert::Infallible;
use std::path::Path;
use tabled::{Table, Tabled};

/// 报告分区
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    LeftOnly,
    RightOnly,
    Both,
    LeftUnmatchable,
    RightUnmatchable,
}

impl Section {
    fn tag(self) -> &'static str {
        match self {
            Section::LeftOnly => "lo",
            Section::RightOnly => "ro",
            Section::Both => "bo",
            Section::LeftUnmatchable => "lu",
            Section::RightUnmatchable => "ru",
        }
    }

    fn color(self) -> Color {
        match self {
            Section::LeftOnly => Color::Red,
            Section::RightOnly => Color::Yellow,
            Section::Both => Color::Green,
            Section::LeftUnmatchable | Section::RightUnmatchable => Color::Magenta,
        }
    }
}

/// 报告中的一行及其缩进说明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub section: Section,
    pub text: String,
    pub details: Vec<String>,
}

/// 报告显示选项
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub show_left: bool,
    pub show_right: bool,
    pub show_both: bool,
    pub show_unmatchable: bool,
    pub all_entries: bool,
    pub only_different: bool,
}

impl From<&CompareArgs> for ReportOptions {
    fn from(args: &CompareArgs) -> Self {
        ReportOptions {
            show_left: !args.no_left,
            show_right: !args.no_right,
            show_both: !args.no_both,
            show_unmatchable: !args.no_unmatchable,
            all_entries: args.all_entries,
            only_different: args.only_different,
        }
    }
}

/// 执行 compare 命令
pub fn execute(args: CompareArgs) -> Result<()> {
    output::print_header("Comparing Sources");

    let key: MatchKey = args.by.into();
    let algorithm: HashAlgorithm = args.hash.into();

    let left = side_builder(Side::Left, &args.left, args.left_type, &args.left_rel)?;
    let right = side_builder(Side::Right, &args.right, args.right_type, &args.right_rel)?;

    // 两侧来源全部确认存在后才开始提取
    let left_sources = left.resolve()?.len();
    let right_sources = right.resolve()?.len();

    let ignore = compile_patterns(&args.ignore)?;

    let options = ExtractOptions {
        algorithm,
        compute_hashes: key == MatchKey::Hash,
        include_dirs: args.dirs,
        include_derivatives: args.include_derivatives,
        jobs: args.jobs,
        progress: !args.no_progress,
    };

    output::print_info(&format!(
        "Building left collection from {} source(s)...",
        left_sources
    ));
    let left = left.build(&options)?;
    output::print_info(&format!(
        "Building right collection from {} source(s)...",
        right_sources
    ));
    let right = right.build(&options)?;

    print_warnings(&left);
    print_warnings(&right);

    output::print_info(&format!(
        "Matching {} left and {} right entries by {}",
        left.len(),
        right.len(),
        key
    ));

    let mut partition = matcher::match_collections(&left, &right, key, &match_options(&args))?;
    apply_ignore(&mut partition, &ignore);

    let diffs = if args.no_both {
        Vec::new()
    } else {
        verify_pairs(&partition, algorithm, args.jobs, !args.no_progress)
    };

    let report = ReportOptions::from(&args);
    output::print_separator();
    for line in render(&partition, &diffs, &report) {
        output::print_tagged(line.section.tag(), line.section.color(), &line.text);
        for detail in &line.details {
            output::print_detail(detail);
        }
    }
    output::print_separator();

    print_summary(&partition, &diffs);

    Ok(())
}

/// 路径键大小写规则；未指定时按平台约定
fn match_options(args: &CompareArgs) -> MatchOptions {
    if args.case_sensitive {
        MatchOptions {
            case_insensitive: false,
        }
    } else if args.ignore_case {
        MatchOptions {
            case_insensitive: true,
        }
    } else {
        MatchOptions::platform_default()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                CompareError::InvalidArgument(format!("invalid ignore pattern '{}': {}", p, e))
            })
        })
        .collect()
}

/// 去掉键匹配忽略模式的分组；不可匹配条目没有键，按显示路径判断
pub fn apply_ignore(partition: &mut Partition<'_>, patterns: &[Regex]) {
    if patterns.is_empty() {
        return;
    }
    let ignored = |text: &str| patterns.iter().any(|re| re.is_match(text));

    partition.left_only.retain(|g| !ignored(&g.key));
    partition.right_only.retain(|g| !ignored(&g.key));
    partition.both.retain(|m| !ignored(&m.key));
    partition
        .left_unmatchable
        .retain(|e| !ignored(&e.display_path()));
    partition
        .right_unmatchable
        .retain(|e| !ignored(&e.display_path()));
}

/// 检查 `both` 中每个匹配对的差异，结果与 `partition.both` 一一对应
///
/// 缺少可比摘要的文件按磁盘位置并行补算。
pub fn verify_pairs(
    partition: &Partition<'_>,
    algorithm: HashAlgorithm,
    jobs: usize,
    progress: bool,
) -> Vec<Vec<Difference>> {
    let runner = BatchRunner::new(jobs).with_progress(progress);
    let (results, _) = runner.run(&partition.both, "Verifying", |matched: &Matched<'_>| {
        let (l, r) = matched.pair();
        Ok::<_, Infallible>(differences(l, r, algorithm, hash_on_demand))
    });
    results.into_iter().flatten().collect()
}

fn hash_on_demand(path: &Path, algorithm: HashAlgorithm) -> Option<FileHash> {
    match digest::hash_file(path, algorithm) {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::warn!("cannot hash {}: {}", path.display(), e);
            None
        }
    }
}

/// 将比较结果渲染为报告行；`diffs` 来自 `verify_pairs`
pub fn render(
    partition: &Partition<'_>,
    diffs: &[Vec<Difference>],
    options: &ReportOptions,
) -> Vec<ReportLine> {
    let mut lines = Vec::new();

    if options.show_left {
        for group in &partition.left_only {
            lines.extend(group_lines(Section::LeftOnly, &group.entries, options));
        }
    }

    if options.show_right {
        for group in &partition.right_only {
            lines.extend(group_lines(Section::RightOnly, &group.entries, options));
        }
    }

    if options.show_both {
        for (matched, pair_diffs) in partition.both.iter().zip(diffs) {
            let (l, r) = matched.pair();
            if options.only_different && pair_diffs.is_empty() {
                continue;
            }

            let mut details: Vec<String> = pair_diffs.iter().map(|d| d.to_string()).collect();
            if options.all_entries {
                let left = matched.left.iter().map(|e| format!("left:  {}", describe(e)));
                details.extend(left);
                let right = matched.right.iter().map(|e| format!("right: {}", describe(e)));
                details.extend(right);
            }

            lines.push(ReportLine {
                section: Section::Both,
                text: pair_text(partition.key, l, r),
                details,
            });
        }
    }

    if options.show_unmatchable {
        for entry in &partition.left_unmatchable {
            lines.push(unmatchable_line(Section::LeftUnmatchable, partition.key, entry));
        }
        for entry in &partition.right_unmatchable {
            lines.push(unmatchable_line(Section::RightUnmatchable, partition.key, entry));
        }
    }

    lines
}

fn group_lines(
    section: Section,
    entries: &[&FileEntry],
    options: &ReportOptions,
) -> Vec<ReportLine> {
    let line = |entry: &FileEntry| ReportLine {
        section,
        text: describe(entry),
        details: Vec::new(),
    };

    if options.all_entries {
        return entries.iter().map(|e| line(*e)).collect();
    }

    let mut first = line(entries[0]);
    if entries.len() > 1 {
        first.text.push_str(&format!(" [x{}]", entries.len()));
    }
    vec![first]
}

/// 路径相同时只显示一次
fn pair_text(key: MatchKey, left: &FileEntry, right: &FileEntry) -> String {
    let l = left.display_path();
    let r = right.display_path();
    if key != MatchKey::Hash && l == r {
        l
    } else {
        format!("{} = {}", l, r)
    }
}

fn unmatchable_line(section: Section, key: MatchKey, entry: &FileEntry) -> ReportLine {
    let reason = match key {
        MatchKey::Hash => "no hash available",
        MatchKey::AbsPath => "no on-disk location",
        MatchKey::RelPath => "no path",
    };
    ReportLine {
        section,
        text: describe(entry),
        details: vec![format!("{} in {}", reason, entry.origin)],
    }
}

fn describe(entry: &FileEntry) -> String {
    let mut text = entry.display_path();
    if entry.is_dir {
        text.push('/');
    } else if let Some(size) = entry.size {
        text.push_str(&format!(" ({} bytes)", size));
    }
    text
}

// ─────────────────────────────────────────────────────────────
// 汇总
// ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

fn summary_rows(partition: &Partition<'_>, diffs: &[Vec<Difference>]) -> Vec<SummaryRow> {
    let differing = diffs.iter().filter(|d| !d.is_empty()).count();

    vec![
        SummaryRow {
            category: "Left only",
            count: partition.left_only.len(),
        },
        SummaryRow {
            category: "Right only",
            count: partition.right_only.len(),
        },
        SummaryRow {
            category: "Both",
            count: partition.both.len(),
        },
        SummaryRow {
            category: "Both, differing",
            count: differing,
        },
        SummaryRow {
            category: "Left unmatchable",
            count: partition.left_unmatchable.len(),
        },
        SummaryRow {
            category: "Right unmatchable",
            count: partition.right_unmatchable.len(),
        },
        SummaryRow {
            category: "Left duplicated keys",
            count: partition.left_duplicates(),
        },
        SummaryRow {
            category: "Right duplicated keys",
            count: partition.right_duplicates(),
        },
    ]
}

fn print_summary(partition: &Partition<'_>, diffs: &[Vec<Difference>]) {
    output::print_header(&format!("Summary (matched by {})", partition.key));
    println!("{}", Table::new(summary_rows(partition, diffs)));

    if partition.left_only.is_empty() && partition.right_only.is_empty() {
        output::print_success("Both sides contain the same keys");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{Collection, CollectionBuilder, SourceSpec};
    use crate::models::{split_path, SourceOrigin, SourceType};
    use std::fs;
    use std::sync::Arc;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(
            split_path(path),
            Arc::new(SourceOrigin::new("src", SourceType::Directory)),
        )
        .with_size(Some(size))
    }

    fn crc(path: &str, size: u64, digest: &str) -> FileEntry {
        entry(path, size).with_hash(FileHash::from_hex(HashAlgorithm::Crc32, digest))
    }

    fn all() -> ReportOptions {
        ReportOptions {
            show_left: true,
            show_right: true,
            show_both: true,
            show_unmatchable: true,
            all_entries: false,
            only_different: false,
        }
    }

    fn sensitive() -> MatchOptions {
        MatchOptions {
            case_insensitive: false,
        }
    }

    fn collections() -> (Collection, Collection) {
        let left = Collection::new(
            Side::Left,
            vec![
                crc("a", 1, "0000000a"),
                entry("b", 2),
                entry("b", 2),
                entry("c", 3),
            ],
        );
        let right = Collection::new(
            Side::Right,
            vec![entry("c", 4), crc("a", 1, "0000000a"), entry("d", 5)],
        );
        (left, right)
    }

    fn verify(p: &Partition<'_>) -> Vec<Vec<Difference>> {
        verify_pairs(p, HashAlgorithm::Crc32, 1, false)
    }

    fn tags(lines: &[ReportLine]) -> Vec<(&'static str, String)> {
        lines
            .iter()
            .map(|l| (l.section.tag(), l.text.clone()))
            .collect()
    }

    #[test]
    fn test_render_sections() {
        let (left, right) = collections();
        let p = matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let lines = render(&p, &verify(&p), &all());

        assert_eq!(
            tags(&lines),
            vec![
                ("lo", "b (2 bytes) [x2]".to_string()),
                ("ro", "d (5 bytes)".to_string()),
                ("bo", "a".to_string()),
                ("bo", "c".to_string()),
            ]
        );
        assert!(lines[2].details.is_empty());
        assert_eq!(lines[3].details, vec!["size different: 3 vs 4"]);
    }

    #[test]
    fn test_render_filters() {
        let (left, right) = collections();
        let p = matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let diffs = verify(&p);

        let options = ReportOptions {
            show_left: false,
            show_right: false,
            only_different: true,
            ..all()
        };
        let lines = render(&p, &diffs, &options);
        assert_eq!(tags(&lines), vec![("bo", "c".to_string())]);

        let options = ReportOptions {
            show_both: false,
            all_entries: true,
            ..all()
        };
        let lines = render(&p, &diffs, &options);
        assert_eq!(lines.iter().filter(|l| l.section == Section::LeftOnly).count(), 2);
    }

    #[test]
    fn test_render_unmatchable() {
        let hashed = crc("x", 1, "deadbeef");
        let left = Collection::new(Side::Left, vec![hashed.clone(), entry("locked", 9)]);
        let right = Collection::new(Side::Right, vec![hashed]);

        let p = matcher::match_collections(&left, &right, MatchKey::Hash, &sensitive()).unwrap();
        let lines = render(&p, &verify(&p), &all());
        assert_eq!(
            tags(&lines),
            vec![
                ("bo", "x = x".to_string()),
                ("lu", "locked (9 bytes)".to_string()),
            ]
        );
        assert!(lines[1].details[0].starts_with("no hash available"));
    }

    #[test]
    fn test_same_size_content_difference_between_directories() {
        let dir = tempfile::tempdir().unwrap();
        let (one, two) = (dir.path().join("one"), dir.path().join("two"));
        fs::create_dir(&one).unwrap();
        fs::create_dir(&two).unwrap();
        fs::write(one.join("a.bin"), b"abc").unwrap();
        fs::write(two.join("a.bin"), b"xyz").unwrap();
        fs::write(one.join("same.bin"), b"same").unwrap();
        fs::write(two.join("same.bin"), b"same").unwrap();

        let options = ExtractOptions::default();
        let left = CollectionBuilder::new(Side::Left)
            .source(SourceSpec::new(&one))
            .build(&options)
            .unwrap();
        let right = CollectionBuilder::new(Side::Right)
            .source(SourceSpec::new(&two))
            .build(&options)
            .unwrap();

        let p = matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let diffs = verify(&p);
        assert_eq!(p.both.len(), 2);
        assert!(matches!(diffs[0][..], [Difference::Hash { .. }]));
        assert!(diffs[1].is_empty());

        let options = ReportOptions {
            only_different: true,
            ..all()
        };
        let lines = render(&p, &diffs, &options);
        assert_eq!(tags(&lines), vec![("bo", "a.bin".to_string())]);
        assert!(lines[0].details[0].starts_with("crc32 different"));
    }

    #[test]
    fn test_same_size_without_content_is_reported() {
        let left = Collection::new(Side::Left, vec![entry("a", 7)]);
        let right = Collection::new(Side::Right, vec![entry("a", 7)]);

        let p = matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let diffs = verify(&p);
        assert_eq!(diffs, vec![vec![Difference::Unverifiable]]);

        let rows = summary_rows(&p, &diffs);
        let differing = rows.iter().find(|r| r.category == "Both, differing");
        assert_eq!(differing.map(|r| r.count), Some(1));
    }

    #[test]
    fn test_apply_ignore() {
        let (left, right) = collections();
        let mut p =
            matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let patterns = compile_patterns(&["^[bd]$".to_string()]).unwrap();
        apply_ignore(&mut p, &patterns);

        assert!(p.left_only.is_empty());
        assert!(p.right_only.is_empty());
        assert_eq!(p.both.len(), 2);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        assert!(matches!(
            compile_patterns(&["(".to_string()]),
            Err(CompareError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_summary_counts() {
        let (left, right) = collections();
        let p = matcher::match_collections(&left, &right, MatchKey::RelPath, &sensitive()).unwrap();
        let rows = summary_rows(&p, &verify(&p));
        let count = |name: &str| rows.iter().find(|r| r.category == name).map(|r| r.count);

        assert_eq!(count("Left only"), Some(1));
        assert_eq!(count("Both"), Some(2));
        assert_eq!(count("Both, differing"), Some(1));
        assert_eq!(count("Left duplicated keys"), Some(1));
    }
}
