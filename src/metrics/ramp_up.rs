use super::{Metric, RepositoryContext};
use crate::github::types::{Fork, RampUpRepository};
use crate::github::RepositoryMetadata;
use crate::logging::Logger;
use crate::resolver::RepositoryRef;
use async_trait::async_trait;
use std::sync::Arc;

/// Forks sampled for first-activity timings
pub const FIRST_FORKS: u32 = 50;
/// Target time used when the size of the code base is unknown
pub const DEFAULT_TARGET_DAYS: f64 = 21.0;
const MIN_TIME_VALUE: f64 = 0.3;

/// Estimates how quickly newcomers become productive
pub struct RampUp {
    github: Arc<dyn RepositoryMetadata>,
    logger: Arc<dyn Logger>,
}

impl RampUp {
    /// Creates the metric
    pub fn new(github: Arc<dyn RepositoryMetadata>, logger: Arc<dyn Logger>) -> Self {
        Self { github, logger }
    }
}

#[async_trait]
impl Metric for RampUp {
    fn name(&self) -> &'static str {
        "RampUp"
    }

    async fn score(&self, repo: &RepositoryRef, context: &RepositoryContext) -> f64 {
        let data = match self.github.ramp_up_data(repo, FIRST_FORKS).await {
            Ok(data) => data,
            Err(e) => {
                self.logger.info(&format!("Error fetching forks and PRs: {}", e));
                return 0.0;
            }
        };

        let (average_days, forks_with_activity) = average_days_to_first_activity(&data);
        self.logger.debug(&format!(
            "Average days to first activity: {}, forks with activity: {}",
            average_days, forks_with_activity
        ));

        let weight = documentation_weight(&data);
        let target = match context.total_loc() {
            Some(loc) => {
                self.logger.debug(&format!("Lines of code: {}", loc));
                target_days(loc)
            }
            None => DEFAULT_TARGET_DAYS,
        };

        let score = score_from_parts(average_days, target, weight);
        self.logger.debug(&format!(
            "Ramp up score for {}: {} (documentation weight {}, target time {})",
            repo, score, weight, target
        ));
        score
    }
}

/// Days a newcomer may reasonably need, stepped by lines of code
pub fn target_days(lines_of_code: u64) -> f64 {
    match lines_of_code {
        0..=5_000 => 7.0,
        5_001..=10_000 => 10.0,
        10_001..=50_000 => 14.0,
        50_001..=100_000 => 21.0,
        100_001..=500_000 => 30.0,
        500_001..=1_000_000 => 45.0,
        _ => 60.0,
    }
}

/// README and CONTRIBUTING both present → 1.0, one → 0.9, none → 0.8
pub fn documentation_weight(data: &RampUpRepository) -> f64 {
    match (data.readme.is_some(), data.contributing.is_some()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.9,
        (false, false) => 0.8,
    }
}

/// Mean whole days from fork creation to its first activity
///
/// Activity dated before the fork itself is ignored, as are forks with no
/// remaining activity. Returns the mean and the number of forks it covers;
/// the mean is `0` when no fork qualifies.
pub fn average_days_to_first_activity(data: &RampUpRepository) -> (f64, usize) {
    let days: Vec<i64> = data
        .forks
        .edges
        .iter()
        .filter_map(|edge| days_to_first_activity(&edge.node))
        .collect();

    if days.is_empty() {
        return (0.0, 0);
    }
    (days.iter().sum::<i64>() as f64 / days.len() as f64, days.len())
}

fn days_to_first_activity(fork: &Fork) -> Option<i64> {
    let first_commit = fork
        .refs
        .nodes
        .first()
        .and_then(|branch| branch.target.as_ref())
        .and_then(|target| target.history.as_ref())
        .and_then(|history| history.edges.first())
        .map(|edge| edge.node.committed_date);
    let first_pull_request = fork.pull_requests.nodes.first().map(|a| a.created_at);
    let first_issue = fork.issues.nodes.first().map(|a| a.created_at);

    [first_commit, first_pull_request, first_issue]
        .into_iter()
        .flatten()
        .filter(|at| *at >= fork.created_at)
        .min()
        .map(|at| (at - fork.created_at).num_days())
}

/// Exponential decay of the average time around the target, weighted by documentation
///
/// Reaching the target exactly scores 1; each target's worth of extra days
/// scales the time value by 1/1.05, which never drops below 0.3.
pub fn score_from_parts(average_days: f64, target_days: f64, documentation_weight: f64) -> f64 {
    let constant = target_days / 1.05_f64.ln();
    let time_value = (-(average_days - target_days) / constant).exp().max(MIN_TIME_VALUE);
    (time_value * documentation_weight).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{BlobRef, Edges};
    use crate::logging::MemoryLogger;
    use crate::test_utils::{at, epoch, fork, FakeMetadata};
    use crate::tools::LineCounts;
    use log::Level;
    use test_case::test_case;

    #[test_case(0, 7.0)]
    #[test_case(5_000, 7.0)]
    #[test_case(5_001, 10.0)]
    #[test_case(12_646, 14.0)]
    #[test_case(100_000, 21.0)]
    #[test_case(250_000, 30.0)]
    #[test_case(1_000_000, 45.0)]
    #[test_case(1_000_001, 60.0)]
    fn test_target_days(loc: u64, expected: f64) {
        assert_eq!(target_days(loc), expected);
    }

    #[test]
    fn test_score_formula() {
        let expected = (-(5.0 - 10.0) / (10.0 / 1.05_f64.ln())).exp().max(0.3).min(1.0);
        assert!((score_from_parts(5.0, 10.0, 1.0) - expected).abs() < 1e-12);
        // Faster than the target still caps at 1
        assert_eq!(score_from_parts(5.0, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_score_floor_and_weight() {
        assert!((score_from_parts(10_000.0, 7.0, 0.8) - 0.24).abs() < 1e-12);
        assert!((score_from_parts(10.0, 10.0, 0.9) - 0.9).abs() < 1e-12);
        // One target's worth late
        assert!((score_from_parts(20.0, 10.0, 1.0) - 1.0 / 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_average_days() {
        let data = RampUpRepository {
            forks: Edges {
                edges: vec![
                    // Issue after 3 days 3 hours, PR later
                    fork(epoch(), Some(at(9, 0)), Some(at(3, 3)), None),
                    // Commit predates the fork, so the PR counts
                    fork(at(10, 0), Some(at(15, 12)), None, Some(at(-30, 0))),
                    // No activity at all
                    fork(epoch(), None, None, None),
                ],
            },
            ..Default::default()
        };

        assert_eq!(average_days_to_first_activity(&data), (4.0, 2));
        assert_eq!(average_days_to_first_activity(&RampUpRepository::default()), (0.0, 0));
    }

    #[test]
    fn test_documentation_weight() {
        let blob = || Some(BlobRef { id: Some("abc".into()) });
        let mut data = RampUpRepository::default();
        assert_eq!(documentation_weight(&data), 0.8);
        data.readme = blob();
        assert_eq!(documentation_weight(&data), 0.9);
        data.contributing = blob();
        assert_eq!(documentation_weight(&data), 1.0);
    }

    #[tokio::test]
    async fn test_unknown_size_uses_default_target() {
        let github = Arc::new(FakeMetadata {
            ramp_up: RampUpRepository {
                forks: Edges {
                    edges: vec![fork(epoch(), None, Some(at(42, 0)), None)],
                },
                ..Default::default()
            },
            ..Default::default()
        });
        let metric = RampUp::new(github, Arc::new(MemoryLogger::new()));
        let repo = RepositoryRef::new("a", "b");

        let unknown = metric.score(&repo, &RepositoryContext::default()).await;
        let small = metric
            .score(
                &repo,
                &RepositoryContext {
                    repo_dir: None,
                    line_counts: Some(LineCounts {
                        total: 1_000,
                        ..Default::default()
                    }),
                },
            )
            .await;

        assert!((unknown - score_from_parts(42.0, 21.0, 0.8)).abs() < 1e-12);
        assert!((small - score_from_parts(42.0, 7.0, 0.8)).abs() < 1e-12);
        assert!(small < unknown);
    }

    #[tokio::test]
    async fn test_failure_scores_zero() {
        let logger = Arc::new(MemoryLogger::new());
        let metric = RampUp::new(Arc::new(FakeMetadata::failing()), logger.clone());

        let score = metric
            .score(&RepositoryRef::new("a", "b"), &RepositoryContext::default())
            .await;

        assert_eq!(score, 0.0);
        assert!(logger.contains(Level::Info, "Error fetching forks and PRs"));
    }
}
