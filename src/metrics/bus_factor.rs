use super::{Metric, RepositoryContext};
use crate::error::Result;
use crate::github::RepositoryMetadata;
use crate::logging::Logger;
use crate::resolver::RepositoryRef;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Length of the trailing commit window
pub const WINDOW_MONTHS: u32 = 18;
const PERCENTILE: f64 = 0.93;
const SCORE_PER_CONTRIBUTOR: f64 = 0.05;

/// Counts contributors who carry a comparable share of recent commits
pub struct BusFactor {
    github: Arc<dyn RepositoryMetadata>,
    logger: Arc<dyn Logger>,
}

impl BusFactor {
    /// Creates the metric
    pub fn new(github: Arc<dyn RepositoryMetadata>, logger: Arc<dyn Logger>) -> Self {
        Self { github, logger }
    }

    /// Commits per contributor login since `since`, over every history page
    ///
    /// Commits whose author has no linked GitHub account are not counted.
    pub async fn commit_tally(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, u64>> {
        let mut tally = HashMap::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .github
                .commit_history_page(repo, since, cursor.as_deref())
                .await?;

            for edge in &page.edges {
                if let Some(login) = edge.node.login() {
                    *tally.entry(login.to_string()).or_insert(0) += 1;
                }
            }

            match (page.page_info.has_next_page, page.page_info.end_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(tally)
    }
}

#[async_trait]
impl Metric for BusFactor {
    fn name(&self) -> &'static str {
        "BusFactor"
    }

    async fn score(&self, repo: &RepositoryRef, _context: &RepositoryContext) -> f64 {
        match self.commit_tally(repo, window_start(Utc::now())).await {
            Ok(tally) => {
                let score = score_from_tally(&tally);
                self.logger.debug(&format!(
                    "Bus factor score for {}: {} from {} contributors",
                    repo,
                    score,
                    tally.len()
                ));
                score
            }
            Err(e) => {
                self.logger
                    .info(&format!("Error calculating bus factor score: {}", e));
                0.0
            }
        }
    }
}

/// Start of the commit window ending at `now`
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or_else(|| now - Duration::days(548))
}

/// Scores a tally by the 93rd percentile of commit counts
///
/// Every contributor at or above the percentile's count adds 0.05, capped at 1.
pub fn score_from_tally(tally: &HashMap<String, u64>) -> f64 {
    let mut counts: Vec<u64> = tally.values().copied().collect();
    if counts.is_empty() {
        return 0.0;
    }
    counts.sort_unstable();

    let index = ((PERCENTILE * counts.len() as f64).floor() as usize).min(counts.len() - 1);
    let threshold = counts[index];
    let above = counts.iter().filter(|&&count| count >= threshold).count();

    (above as f64 * SCORE_PER_CONTRIBUTOR).clamp(0.0, 1.0)
}
