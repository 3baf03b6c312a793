//! Sequential experiment runner.
//!
//! Pipeline flow:
//! Grid cells → one completion call each → ResultRecords (grid order) → exporter / reflection
//!
//! Calls are awaited one at a time; a failed call is recorded with the
//! sentinel text and never stops the run.

use crate::client::CompletionClient;
use crate::models::{ExperimentConfig, ParameterTuple, ResultRecord, RunStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Drives the grid through a completion client.
pub struct ExperimentRunner {
    client: Arc<dyn CompletionClient>,
    progress: ProgressBar,
}

impl ExperimentRunner {
    /// Create a runner with progress output disabled.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on a visible terminal bar.
    pub fn with_progress_bar(mut self) -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        self.progress = pb;
        self
    }

    /// Run every grid cell and return one record per cell, in grid order.
    pub async fn run(
        &self,
        config: &ExperimentConfig,
        grid: &[ParameterTuple],
    ) -> Vec<ResultRecord> {
        self.run_with_stats(config, grid).await.0
    }

    /// Run every grid cell, also returning success/failure counts.
    pub async fn run_with_stats(
        &self,
        config: &ExperimentConfig,
        grid: &[ParameterTuple],
    ) -> (Vec<ResultRecord>, RunStats) {
        let start = Instant::now();
        let total = grid.len();
        let model = config.model.as_str();

        info!(total, model, "Running {total} parameter combinations");
        self.progress.set_length(total as u64);
        self.progress.set_position(0);

        let mut records = Vec::with_capacity(total);
        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for (idx, params) in grid.iter().enumerate() {
            let combination = idx + 1;
            self.progress
                .suspend(|| info!("Combination {combination}/{total}: {params}"));

            let record = match self.client.complete(config, params).await {
                Ok(text) => {
                    stats.succeeded += 1;
                    ResultRecord::new(*params, model, text)
                }
                Err(e) => {
                    stats.failed += 1;
                    self.progress.suspend(|| {
                        warn!(
                            combination,
                            total,
                            model,
                            %params,
                            error = %e,
                            "Combination failed, recording error sentinel"
                        )
                    });
                    ResultRecord::failed(*params, model)
                }
            };
            records.push(record);

            self.progress.inc(1);
            self.progress
                .set_message(format!("ok: {}, failed: {}", stats.succeeded, stats.failed));
        }

        self.progress.finish_with_message(format!(
            "Done! {} ok, {} failed",
            stats.succeeded, stats.failed
        ));

        stats.runtime_secs = start.elapsed().as_secs_f64();
        stats.finalize();

        info!(
            total = stats.total,
            succeeded = stats.succeeded,
            failed = stats.failed,
            runtime_secs = format!("{:.1}", stats.runtime_secs),
            "Sweep complete"
        );

        (records, stats)
    }
}
