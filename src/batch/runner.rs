//! # 批量执行器
//!
//! 并行执行逐项任务（目录遍历中的文件哈希），结果保持输入顺序。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 成功/失败计数
//!
//! ## 依赖关系
//! - 被 `parsers/directory.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 批量处理结果统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// 成功数量
    pub success: usize,
    /// 失败数量
    pub failed: usize,
}

impl BatchStats {
    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 是否显示进度条
    progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 = 全部 CPU）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            progress: false,
        }
    }

    /// 设置是否显示进度条
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// 并行处理，返回与输入顺序一致的结果
    pub fn run<T, V, E, F>(
        &self,
        items: &[T],
        message: &str,
        processor: F,
    ) -> (Vec<Result<V, E>>, BatchStats)
    where
        T: Sync,
        V: Send,
        E: Send,
        F: Fn(&T) -> Result<V, E> + Sync + Send,
    {
        let pb = progress::create_bar(self.progress, items.len() as u64, message);

        let success_count = AtomicUsize::new(0);
        let failed_count = AtomicUsize::new(0);

        let work = || -> Vec<Result<V, E>> {
            items
                .par_iter()
                .map(|item| {
                    let result = processor(item);
                    match &result {
                        Ok(_) => success_count.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed_count.fetch_add(1, Ordering::Relaxed),
                    };
                    pb.inc(1);
                    result
                })
                .collect()
        };

        // 线程池创建失败时退回全局线程池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                tracing::warn!("failed to build thread pool, using global pool: {}", e);
                work()
            }
        };

        pb.finish_and_clear();

        let stats = BatchStats {
            success: success_count.into_inner(),
            failed: failed_count.into_inner(),
        };

        (results, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_preserves_order() {
        let items: Vec<u32> = (0..100).collect();
        let runner = BatchRunner::new(4);
        let (results, stats) = runner.run(&items, "Squaring", |n| -> Result<u32, String> {
            Ok(n * n)
        });

        let values: Vec<u32> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values[10], 100);
        assert_eq!(values.len(), 100);
        assert_eq!(stats, BatchStats { success: 100, failed: 0 });
    }

    #[test]
    fn test_run_counts_failures() {
        let items = vec![1, 2, 3, 4];
        let (results, stats) = BatchRunner::new(0).run(&items, "Checking", |n| {
            if n % 2 == 0 {
                Ok(*n)
            } else {
                Err(format!("odd: {}", n))
            }
        });

        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap(), &2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total(), 4);
    }
}
