//! Delay check orchestration

use super::{ExecutionResults, ExecutionSummary, FailurePolicy};
use crate::{
    client::ControlApi,
    error::{AppError, Result},
    logging::Logger,
    models::{DelayOutcome, ProxyReport, Settings},
};
use futures::future::join_all;
use std::{sync::Arc, time::Instant};
use tokio::sync::Semaphore;

/// Runs a delay check against every leaf proxy the daemon knows about
pub struct CheckExecutor {
    api: Arc<dyn ControlApi>,
    concurrency: usize,
    policy: FailurePolicy,
    logger: Logger,
}

impl CheckExecutor {
    /// Sequential executor that isolates per-proxy failures
    pub fn new(api: Arc<dyn ControlApi>) -> Self {
        Self {
            api,
            concurrency: 1,
            policy: FailurePolicy::default(),
            logger: Logger::disabled(),
        }
    }

    pub fn from_settings(api: Arc<dyn ControlApi>, settings: &Settings) -> Self {
        Self::new(api)
            .with_concurrency(settings.effective_concurrency())
            .with_policy(settings.failure_policy())
    }

    /// Maximum checks in flight; values below 1 are treated as 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// List leaf proxies, check each one and return the reports in list order
    pub async fn exec(&self) -> Result<ExecutionResults> {
        let names = self.api.list_proxy_names().await?;
        self.check_names(names).await
    }

    /// Check the given proxies; reports keep the order of `names`
    pub async fn check_names(&self, names: Vec<String>) -> Result<ExecutionResults> {
        let start = Instant::now();

        self.logger.info("starting delay checks")
            .field("proxies", names.len())
            .field("concurrency", self.concurrency)
            .field("policy", format!("{:?}", self.policy))
            .log();

        let reports = if self.concurrency <= 1 {
            self.check_sequential(names).await?
        } else {
            self.check_concurrent(names).await?
        };

        let summary = ExecutionSummary::from_reports(&reports, start.elapsed());

        self.logger.info("delay checks finished")
            .field("total", summary.total)
            .field("good", summary.good)
            .field("degraded", summary.degraded)
            .field("bad", summary.bad)
            .field("errored", summary.errored)
            .field("duration_ms", summary.duration.as_millis() as u64)
            .log();

        Ok(ExecutionResults { reports, summary })
    }

    async fn check_sequential(&self, names: Vec<String>) -> Result<Vec<ProxyReport>> {
        let mut reports = Vec::with_capacity(names.len());

        for (index, name) in names.into_iter().enumerate() {
            let outcome = self.api.get_proxy_delay(&name).await;
            reports.push(self.classify(index, name, outcome)?);
        }

        Ok(reports)
    }

    async fn check_concurrent(&self, names: Vec<String>) -> Result<Vec<ProxyReport>> {
        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let abort = self.policy == FailurePolicy::Abort;

        let tasks: Vec<_> = names
            .iter()
            .cloned()
            .map(|name| {
                let api = Arc::clone(&self.api);
                let limiter = Arc::clone(&limiter);

                tokio::spawn(async move {
                    // Closed once an aborting failure was seen; remaining checks are skipped
                    let _permit = Arc::clone(&limiter).acquire_owned().await.ok()?;
                    let outcome = api.get_proxy_delay(&name).await;
                    if abort && outcome.is_err() {
                        limiter.close();
                    }
                    Some(outcome)
                })
            })
            .collect();

        let joined = join_all(tasks).await;

        let mut reports = Vec::with_capacity(names.len());
        for (index, (name, joined)) in names.into_iter().zip(joined).enumerate() {
            let outcome = joined.map_err(|e| AppError::internal(format!("delay check task for '{}' failed: {}", name, e)))?;
            match outcome {
                Some(outcome) => reports.push(self.classify(index, name, outcome)?),
                None => continue,
            }
        }

        Ok(reports)
    }

    /// Turn one delay check into a report, or stop the run per the failure policy
    fn classify(&self, index: usize, name: String, outcome: Result<DelayOutcome>) -> Result<ProxyReport> {
        match outcome {
            Ok(outcome) => {
                let report = ProxyReport::measured(index, name, outcome);
                self.logger.debug("proxy checked")
                    .field("name", &report.name)
                    .field("outcome", report.outcome.to_string())
                    .field("severity", report.severity)
                    .log();
                Ok(report)
            }
            Err(error) if self.policy == FailurePolicy::Isolate && is_isolatable(&error) => {
                self.logger.warn("delay check failed")
                    .field("name", &name)
                    .error_info(&error)
                    .log();
                Ok(ProxyReport::errored(index, name, &error))
            }
            Err(error) => Err(error),
        }
    }
}

/// Failures confined to a single proxy. A rejected secret affects every request.
fn is_isolatable(error: &AppError) -> bool {
    matches!(error, AppError::Upstream(_) | AppError::ProxyNotFound(_))
}
