use super::{Metric, RepositoryContext};
use crate::github::types::ResponsivenessRepository;
use crate::github::RepositoryMetadata;
use crate::logging::Logger;
use crate::resolver::RepositoryRef;
use async_trait::async_trait;
use std::sync::Arc;

/// Closed issues sampled for response times
pub const FIRST_ISSUES: u32 = 100;
/// Median response time, in days, that still earns full marks
const TARGET_RESPONSE_DAYS: f64 = 7.0;

/// Rates how quickly and how completely maintainers handle issues
pub struct ResponsiveMaintainer {
    github: Arc<dyn RepositoryMetadata>,
    logger: Arc<dyn Logger>,
}

impl ResponsiveMaintainer {
    /// Creates the metric
    pub fn new(github: Arc<dyn RepositoryMetadata>, logger: Arc<dyn Logger>) -> Self {
        Self { github, logger }
    }
}

#[async_trait]
impl Metric for ResponsiveMaintainer {
    fn name(&self) -> &'static str {
        "ResponsiveMaintainer"
    }

    async fn score(&self, repo: &RepositoryRef, _context: &RepositoryContext) -> f64 {
        let data = match self.github.responsiveness_data(repo, FIRST_ISSUES).await {
            Ok(data) => data,
            Err(e) => {
                self.logger.info(&format!(
                    "Error calculating responsive maintainer score: {}",
                    e
                ));
                return 0.0;
            }
        };

        let mut response_days = response_days(&data);
        let median = match median(&mut response_days) {
            Some(median) => median,
            None => {
                self.logger
                    .debug(&format!("No closed issues to measure for {}", repo));
                return 0.0;
            }
        };

        let total = data.all_issues.total_count;
        let closed = data.total_closed_issues.total_count;
        if total == 0 {
            self.logger.debug(&format!("No issues reported for {}", repo));
            return 0.0;
        }
        let closure_rate = closed as f64 / total as f64;

        let score = response_factor(median) * closure_rate;
        self.logger.debug(&format!(
            "Responsive maintainer score for {}: {} with median response time: {} days, closure rate: {}",
            repo, score, median, closure_rate
        ));
        score
    }
}

/// Whole days each sampled issue stayed open
pub fn response_days(data: &ResponsivenessRepository) -> Vec<i64> {
    data.issues
        .edges
        .iter()
        .filter_map(|edge| {
            edge.node
                .closed_at
                .map(|closed| (closed - edge.node.created_at).num_days())
        })
        .collect()
}

/// Median of `values`; the mean of the middle two for an even count
pub fn median(values: &mut [i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 1 {
        values[mid] as f64
    } else {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    })
}

/// `min(1, 7 / median)`; issues closed the same day count as immediate
pub fn response_factor(median_days: f64) -> f64 {
    if median_days <= 0.0 {
        return 1.0;
    }
    (TARGET_RESPONSE_DAYS / median_days).min(1.0)
}
