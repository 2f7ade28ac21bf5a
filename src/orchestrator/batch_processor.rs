//! 批量评分处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量提交的评分和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建评分流程
//! 2. **批量加载**：扫描并加载所有待评分的提交（`Vec<SubmissionDraft>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **停止信号**：只监听一次 Ctrl+C，取消进行中的评分并停止调度后续提交
//! 6. **全局统计**：汇总正常评分和降级结果数量

use crate::config::Config;
use crate::models::SubmissionDraft;
use crate::orchestrator::submission_processor::{self, GradeOutcome};
use crate::services::FailureLog;
use crate::utils::logging;
use crate::workflow::GradingFlow;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
    failure_log: Arc<FailureLog>,
}

/// 评分统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub graded: usize,
    pub degraded: usize,
    /// 结果文件写出失败或任务崩溃
    pub failed: usize,
    /// 收到停止信号后未调度的提交
    pub skipped: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config.llm_model_name, config.max_concurrent_submissions);

        let flow = GradingFlow::new(&config)?;
        Ok(Self::with_flow(config, flow))
    }

    /// 使用已创建的评分流程
    pub fn with_flow(config: Config, flow: GradingFlow) -> Self {
        let failure_log = FailureLog::with_path(config.failure_log_file.clone());
        Self {
            config,
            flow: Arc::new(flow),
            failure_log: Arc::new(failure_log),
        }
    }

    /// 运行应用主逻辑，Ctrl+C 时停止
    pub async fn run(&self) -> Result<RunStats> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("⚠️ 收到 Ctrl+C，取消进行中的评分并停止调度");
                    let _ = shutdown_tx.send(true);
                }
                Err(e) => error!("无法监听 Ctrl+C: {}", e),
            }
        });

        let result = self.run_until(shutdown_rx).await;
        listener.abort();
        result
    }

    /// 运行应用主逻辑，`shutdown` 变为 true 时停止
    pub async fn run_until(&self, shutdown: watch::Receiver<bool>) -> Result<RunStats> {
        info!("\n📁 正在扫描待评分的提交...");
        let drafts = crate::models::load_all_toml_files(&self.config.submissions_folder).await?;

        if drafts.is_empty() {
            warn!("⚠️ 没有找到待评分的TOML文件，程序结束");
            return Ok(RunStats::default());
        }

        info!("✓ 找到 {} 份待评分的提交", drafts.len());
        let stats = self.process_all(drafts, shutdown).await?;

        logging::print_final_stats(
            stats.graded,
            stats.degraded,
            stats.total,
            &self.config.output_log_file,
        );
        if stats.skipped > 0 {
            warn!("⚠️ 已停止，未评分提交: {}", stats.skipped);
        }

        Ok(stats)
    }

    async fn process_all(
        &self,
        drafts: Vec<SubmissionDraft>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunStats> {
        let batch_size = self.config.max_concurrent_submissions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = drafts.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in drafts.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            if *shutdown.borrow() {
                stats.skipped += total - batch_start;
                warn!("⚠️ 收到停止信号，跳过剩余 {} 份提交", total - batch_start);
                break;
            }

            logging::log_batch_start(
                batch_idx + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_stats = self
                .process_batch(batch, batch_start, semaphore.clone(), &shutdown)
                .await?;
            logging::log_batch_complete(batch_idx + 1, batch_stats.graded, batch.len());

            stats.graded += batch_stats.graded;
            stats.degraded += batch_stats.degraded;
            stats.failed += batch_stats.failed;
            stats.skipped += batch_stats.skipped;
        }

        Ok(stats)
    }

    async fn process_batch(
        &self,
        batch: &[SubmissionDraft],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<RunStats> {
        let mut handles = Vec::new();
        let mut skipped = 0;

        for (idx, draft) in batch.iter().enumerate() {
            let index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            if *shutdown.borrow() {
                skipped += 1;
                continue;
            }

            let flow = self.flow.clone();
            let failure_log = self.failure_log.clone();
            let config = self.config.clone();
            let draft = draft.clone();
            let shutdown = shutdown.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                submission_processor::process_submission(
                    &flow,
                    &failure_log,
                    draft,
                    index,
                    &config,
                    shutdown,
                )
                .await
            });
            handles.push((index, handle));
        }

        let mut stats = RunStats {
            skipped,
            ..Default::default()
        };
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(GradeOutcome::Graded)) => stats.graded += 1,
                Ok(Ok(GradeOutcome::Degraded)) => stats.degraded += 1,
                Ok(Err(e)) => {
                    error!("[提交 #{}] ❌ 处理过程中发生错误: {:#}", index, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("[提交 #{}] 任务执行失败: {}", index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}
