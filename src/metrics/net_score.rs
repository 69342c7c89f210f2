use super::{round_latency, round_score, timed, Metric, MetricScore, RepositoryContext, UNAVAILABLE};
use super::{BusFactor, Correctness, License, RampUp, ResponsiveMaintainer};
use crate::batch::ResolvedEntry;
use crate::error::Result;
use crate::github::RepositoryMetadata;
use crate::logging::Logger;
use crate::parallel::ParallelProcessor;
use crate::resolver::RepositoryRef;
use crate::tools::{LineCounter, SourceControl, StaticAnalyzer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const LICENSE_WEIGHT: f64 = 0.30;
const RAMP_UP_WEIGHT: f64 = 0.10;
const RESPONSIVENESS_WEIGHT: f64 = 0.15;
const BUS_FACTOR_WEIGHT: f64 = 0.15;
const CORRECTNESS_WEIGHT: f64 = 0.30;

const DEFAULT_CLONE_BASE: &str = "https://github.com";

/// One output line; field order is the serialized key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetScoreRecord {
    /// Input line, trimmed
    #[serde(rename = "URL")]
    pub url: String,
    /// Weighted combination of the five scores
    #[serde(rename = "NetScore")]
    pub net_score: f64,
    /// Seconds for the whole evaluation
    #[serde(rename = "NetScore_Latency")]
    pub net_score_latency: f64,
    /// Ramp-up score
    #[serde(rename = "RampUp")]
    pub ramp_up: f64,
    /// Ramp-up latency in seconds
    #[serde(rename = "RampUp_Latency")]
    pub ramp_up_latency: f64,
    /// Correctness score
    #[serde(rename = "Correctness")]
    pub correctness: f64,
    /// Correctness latency in seconds
    #[serde(rename = "Correctness_Latency")]
    pub correctness_latency: f64,
    /// Bus factor score
    #[serde(rename = "BusFactor")]
    pub bus_factor: f64,
    /// Bus factor latency in seconds
    #[serde(rename = "BusFactor_Latency")]
    pub bus_factor_latency: f64,
    /// Responsive maintainer score
    #[serde(rename = "ResponsiveMaintainer")]
    pub responsive_maintainer: f64,
    /// Responsive maintainer latency in seconds
    #[serde(rename = "ResponsiveMaintainer_Latency")]
    pub responsive_maintainer_latency: f64,
    /// License score, 0 or 1
    #[serde(rename = "License")]
    pub license: f64,
    /// License latency in seconds
    #[serde(rename = "License_Latency")]
    pub license_latency: f64,
}

/// The five metric results of one repository
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricResults {
    /// License compatibility
    pub license: MetricScore,
    /// Onboarding cost
    pub ramp_up: MetricScore,
    /// Issue handling
    pub responsive_maintainer: MetricScore,
    /// Contributor concentration
    pub bus_factor: MetricScore,
    /// Lint findings per line
    pub correctness: MetricScore,
}

impl NetScoreRecord {
    /// Rounds the results for display and derives the net score from the rounded scores
    pub fn compose(url: &str, results: MetricResults, net_latency: f64) -> Self {
        let license = results.license.rounded();
        let ramp_up = results.ramp_up.rounded();
        let responsive = results.responsive_maintainer.rounded();
        let bus_factor = results.bus_factor.rounded();
        let correctness = results.correctness.rounded();

        Self {
            url: url.trim().to_string(),
            net_score: round_score(net_score(
                license.score,
                ramp_up.score,
                responsive.score,
                bus_factor.score,
                correctness.score,
            )),
            net_score_latency: round_latency(net_latency),
            ramp_up: ramp_up.score,
            ramp_up_latency: ramp_up.latency,
            correctness: correctness.score,
            correctness_latency: correctness.latency,
            bus_factor: bus_factor.score,
            bus_factor_latency: bus_factor.latency,
            responsive_maintainer: responsive.score,
            responsive_maintainer_latency: responsive.latency,
            license: license.score,
            license_latency: license.latency,
        }
    }

    /// Record for an entry whose evaluation never completed
    pub fn unavailable(url: &str) -> Self {
        let missing = MetricScore::UNAVAILABLE;
        Self::compose(
            url,
            MetricResults {
                license: missing,
                ramp_up: missing,
                responsive_maintainer: missing,
                bus_factor: missing,
                correctness: missing,
            },
            UNAVAILABLE,
        )
    }

    /// Serializes the record as a single JSON line
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `0.30·license + 0.10·ramp_up + 0.15·responsiveness + 0.15·bus_factor + 0.30·correctness`
///
/// Any unavailable component makes the net score unavailable.
pub fn net_score(
    license: f64,
    ramp_up: f64,
    responsive_maintainer: f64,
    bus_factor: f64,
    correctness: f64,
) -> f64 {
    let scores = [license, ramp_up, responsive_maintainer, bus_factor, correctness];
    if scores.contains(&UNAVAILABLE) {
        return UNAVAILABLE;
    }
    LICENSE_WEIGHT * license
        + RAMP_UP_WEIGHT * ramp_up
        + RESPONSIVENESS_WEIGHT * responsive_maintainer
        + BUS_FACTOR_WEIGHT * bus_factor
        + CORRECTNESS_WEIGHT * correctness
}

/// The metrics an [`Aggregator`] runs
#[derive(Clone)]
pub struct MetricSet {
    /// Weighted 0.30
    pub license: Arc<dyn Metric>,
    /// Weighted 0.10
    pub ramp_up: Arc<dyn Metric>,
    /// Weighted 0.15
    pub responsive_maintainer: Arc<dyn Metric>,
    /// Weighted 0.15
    pub bus_factor: Arc<dyn Metric>,
    /// Weighted 0.30
    pub correctness: Arc<dyn Metric>,
}

impl MetricSet {
    /// The five production metrics over the given collaborators
    pub fn standard(
        github: Arc<dyn RepositoryMetadata>,
        analyzer: Arc<dyn StaticAnalyzer>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            license: Arc::new(License::new(github.clone(), logger.clone())),
            ramp_up: Arc::new(RampUp::new(github.clone(), logger.clone())),
            responsive_maintainer: Arc::new(ResponsiveMaintainer::new(github.clone(), logger.clone())),
            bus_factor: Arc::new(BusFactor::new(github, logger.clone())),
            correctness: Arc::new(Correctness::new(analyzer, logger)),
        }
    }
}

/// Evaluates resolved entries into net score records
pub struct Aggregator {
    metrics: MetricSet,
    source_control: Arc<dyn SourceControl>,
    line_counter: Arc<dyn LineCounter>,
    logger: Arc<dyn Logger>,
    clone_base: String,
    concurrent: bool,
}

impl Aggregator {
    /// Creates an aggregator running the metrics concurrently, cloning from github.com
    pub fn new(
        metrics: MetricSet,
        source_control: Arc<dyn SourceControl>,
        line_counter: Arc<dyn LineCounter>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            metrics,
            source_control,
            line_counter,
            logger,
            clone_base: DEFAULT_CLONE_BASE.to_string(),
            concurrent: true,
        }
    }

    /// Sets the base URL repositories are cloned from
    pub fn with_clone_base(mut self, base: &str) -> Self {
        self.clone_base = base.to_string();
        self
    }

    /// Runs the metrics of one entry one after another instead of concurrently
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Clones the repository and counts its lines
    ///
    /// A failed step leaves its field empty; the metrics degrade accordingly.
    pub async fn prepare_context(&self, repo: &RepositoryRef) -> RepositoryContext {
        let repo_dir = match self
            .source_control
            .materialize(&repo.clone_url(&self.clone_base), &repo.working_dir_name())
            .await
        {
            Ok(dir) => Some(dir),
            Err(e) => {
                self.logger
                    .info(&format!("Failed to clone {}: {}", repo, e));
                None
            }
        };

        let line_counts = match &repo_dir {
            Some(dir) => match self.line_counter.count(dir).await {
                Ok(counts) => {
                    self.logger
                        .debug(&format!("Lines of code in {}: {}", repo, counts.total));
                    Some(counts)
                }
                Err(e) => {
                    self.logger
                        .info(&format!("Error counting lines of code: {}", e));
                    None
                }
            },
            None => None,
        };

        RepositoryContext {
            repo_dir,
            line_counts,
        }
    }

    /// Evaluates one entry
    pub async fn aggregate(&self, entry: &ResolvedEntry) -> NetScoreRecord {
        let start = Instant::now();
        let repo = &entry.repo;
        let context = self.prepare_context(repo).await;
        let metrics = &self.metrics;

        let (license, ramp_up, responsive_maintainer, bus_factor, correctness) = if self.concurrent {
            tokio::join!(
                timed(metrics.license.as_ref(), repo, &context),
                timed(metrics.ramp_up.as_ref(), repo, &context),
                timed(metrics.responsive_maintainer.as_ref(), repo, &context),
                timed(metrics.bus_factor.as_ref(), repo, &context),
                timed(metrics.correctness.as_ref(), repo, &context),
            )
        } else {
            (
                timed(metrics.license.as_ref(), repo, &context).await,
                timed(metrics.ramp_up.as_ref(), repo, &context).await,
                timed(metrics.responsive_maintainer.as_ref(), repo, &context).await,
                timed(metrics.bus_factor.as_ref(), repo, &context).await,
                timed(metrics.correctness.as_ref(), repo, &context).await,
            )
        };

        let results = MetricResults {
            license,
            ramp_up,
            responsive_maintainer,
            bus_factor,
            correctness,
        };
        for (metric, result) in [
            (&metrics.license, license),
            (&metrics.ramp_up, ramp_up),
            (&metrics.responsive_maintainer, responsive_maintainer),
            (&metrics.bus_factor, bus_factor),
            (&metrics.correctness, correctness),
        ] {
            self.logger.debug(&format!(
                "{} for {}: {} in {:.3}s",
                metric.name(),
                repo,
                result.score,
                result.latency
            ));
        }

        NetScoreRecord::compose(&entry.url, results, start.elapsed().as_secs_f64())
    }

    /// Evaluates every entry and prints each record as one JSON line
    ///
    /// With `jobs` above one, up to that many entries are evaluated at once
    /// and the records are printed in input order once all are done.
    pub async fn score_batch(self: &Arc<Self>, entries: Vec<ResolvedEntry>, jobs: usize) -> Vec<NetScoreRecord> {
        if jobs <= 1 {
            let mut records = Vec::with_capacity(entries.len());
            for entry in &entries {
                let record = self.aggregate(entry).await;
                self.emit(&record);
                records.push(record);
            }
            return records;
        }

        let processor = ParallelProcessor::new(jobs);
        let urls: Vec<String> = entries.iter().map(|entry| entry.url.clone()).collect();
        let tasks: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let aggregator = Arc::clone(self);
                async move { aggregator.aggregate(&entry).await }
            })
            .collect();

        let records: Vec<NetScoreRecord> = processor
            .process(tasks)
            .await
            .into_iter()
            .zip(urls)
            .map(|(result, url)| {
                result.unwrap_or_else(|e| {
                    self.logger
                        .info(&format!("Evaluation of {} did not complete: {}", url.trim(), e));
                    NetScoreRecord::unavailable(&url)
                })
            })
            .collect();

        for record in &records {
            self.emit(record);
        }
        records
    }

    fn emit(&self, record: &NetScoreRecord) {
        match record.to_json_line() {
            Ok(line) => self.logger.console(&line),
            Err(e) => self
                .logger
                .info(&format!("Failed to serialize result for {}: {}", record.url, e)),
        }
    }
}
