//! The five repository metrics and the net score that combines them.
//!
//! Every metric maps a repository to a score in `[0, 1]`. Failures never
//! escape a metric: they are logged and the metric reports `0`.

use crate::resolver::RepositoryRef;
use crate::tools::LineCounts;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;

/// Contributor concentration over recent history
pub mod bus_factor;
/// Static analysis findings per line of code
pub mod correctness;
/// License compatibility
pub mod license;
/// Weighted combination of the other five
pub mod net_score;
/// Onboarding cost estimated from fork activity
pub mod ramp_up;
/// Issue response times and closure rate
pub mod responsive_maintainer;

pub use bus_factor::BusFactor;
pub use correctness::Correctness;
pub use license::License;
pub use net_score::{Aggregator, MetricResults, MetricSet, NetScoreRecord};
pub use ramp_up::RampUp;
pub use responsive_maintainer::ResponsiveMaintainer;

/// Score and latency reported when a value could not be computed
pub const UNAVAILABLE: f64 = -1.0;

/// A score with the wall-clock time it took to compute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScore {
    /// Score in `[0, 1]`, or [`UNAVAILABLE`]
    pub score: f64,
    /// Seconds, or [`UNAVAILABLE`]
    pub latency: f64,
}

impl MetricScore {
    /// Both values unknown
    pub const UNAVAILABLE: Self = Self {
        score: UNAVAILABLE,
        latency: UNAVAILABLE,
    };

    /// Score rounded to 2 decimals and latency to 3
    pub fn rounded(self) -> Self {
        Self {
            score: round_score(self.score),
            latency: round_latency(self.latency),
        }
    }
}

/// Rounds a score to 2 decimals
pub fn round_score(score: f64) -> f64 {
    round_to(score, 100.0)
}

/// Rounds a latency to 3 decimals
pub fn round_latency(latency: f64) -> f64 {
    round_to(latency, 1000.0)
}

fn round_to(value: f64, scale: f64) -> f64 {
    if value == UNAVAILABLE {
        return value;
    }
    (value * scale).round() / scale
}

/// Facts about a repository computed once and shared by the metrics
#[derive(Debug, Clone, Default)]
pub struct RepositoryContext {
    /// Local working copy, `None` when cloning failed
    pub repo_dir: Option<PathBuf>,
    /// Code line counts of the working copy, `None` when counting failed
    pub line_counts: Option<LineCounts>,
}

impl RepositoryContext {
    /// Total lines of code, when known
    pub fn total_loc(&self) -> Option<u64> {
        self.line_counts.as_ref().map(|counts| counts.total)
    }
}

/// A single repository metric
#[async_trait]
pub trait Metric: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Scores `repo`, returning a value in `[0, 1]`
    ///
    /// Implementations log failures and return `0` instead of erroring.
    async fn score(&self, repo: &RepositoryRef, context: &RepositoryContext) -> f64;
}

/// Runs `metric` and measures how long it took
pub async fn timed(metric: &dyn Metric, repo: &RepositoryRef, context: &RepositoryContext) -> MetricScore {
    let start = Instant::now();
    let score = metric.score(repo, context).await;
    MetricScore {
        score: score.clamp(0.0, 1.0),
        latency: start.elapsed().as_secs_f64(),
    }
}
