//! In-memory collaborators shared by the unit tests.

use crate::error::{Result, ScoreError};
use crate::github::types::{
    Activity, BranchTarget, ClosedIssue, CommitAuthor, CommitDate, CommitTarget, Count, Edge,
    Edges, Fork, History, HistoryCommit, LicenseInfo, Nodes, PageInfo, RampUpRepository,
    ResponsivenessRepository, User,
};
use crate::github::RepositoryMetadata;
use crate::resolver::RepositoryRef;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned GitHub answers; with `fail` set every call errors
#[derive(Default)]
pub struct FakeMetadata {
    pub license: Option<LicenseInfo>,
    pub ramp_up: RampUpRepository,
    pub responsiveness: ResponsivenessRepository,
    /// Served in order; the cursor of page `n` is `"page-n"`
    pub history_pages: Vec<History>,
    pub fail: bool,
    pub history_calls: AtomicUsize,
}

impl FakeMetadata {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(ScoreError::GitHubApi(
                "Could not resolve to a Repository".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryMetadata for FakeMetadata {
    async fn license_info(&self, _repo: &RepositoryRef) -> Result<Option<LicenseInfo>> {
        self.check()?;
        Ok(self.license.clone())
    }

    async fn ramp_up_data(&self, _repo: &RepositoryRef, _first_forks: u32) -> Result<RampUpRepository> {
        self.check()?;
        Ok(self.ramp_up.clone())
    }

    async fn responsiveness_data(
        &self,
        _repo: &RepositoryRef,
        _first_issues: u32,
    ) -> Result<ResponsivenessRepository> {
        self.check()?;
        Ok(self.responsiveness.clone())
    }

    async fn commit_history_page(
        &self,
        _repo: &RepositoryRef,
        _since: DateTime<Utc>,
        after: Option<&str>,
    ) -> Result<History> {
        self.check()?;
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let index = match after {
            None => 0,
            Some(cursor) => cursor
                .trim_start_matches("page-")
                .parse::<usize>()
                .map_err(|_| ScoreError::GitHubApi(format!("bad cursor {}", cursor)))?,
        };
        Ok(self.history_pages.get(index).cloned().unwrap_or_default())
    }
}

/// A fixed instant tests measure from
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `epoch()` plus `days` whole days and `hours` hours
pub fn at(days: i64, hours: i64) -> DateTime<Utc> {
    epoch() + Duration::days(days) + Duration::hours(hours)
}

/// A commit by `login`, or by an unlinked author for `None`
pub fn commit(login: Option<&str>) -> Edge<HistoryCommit> {
    Edge {
        node: HistoryCommit {
            author: Some(CommitAuthor {
                user: login.map(|login| User {
                    login: login.to_string(),
                }),
            }),
            committed_date: epoch(),
        },
    }
}

/// `counts[i]` commits by contributor `user{i}`
pub fn commits_by(counts: &[usize]) -> Vec<Edge<HistoryCommit>> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(i, &n)| {
            let login = format!("user{}", i);
            (0..n).map(move |_| commit(Some(&login)))
        })
        .collect()
}

/// Splits `commits` into pages of `page_size` chained by cursors
pub fn paginate(commits: Vec<Edge<HistoryCommit>>, page_size: usize) -> Vec<History> {
    let chunks: Vec<_> = commits.chunks(page_size.max(1)).map(<[_]>::to_vec).collect();
    let last = chunks.len().saturating_sub(1);
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, edges)| History {
            edges,
            page_info: PageInfo {
                end_cursor: Some(format!("page-{}", i + 1)),
                has_next_page: i < last,
            },
        })
        .collect()
}

/// A fork created at `created` with optional first PR, issue and commit times
pub fn fork(
    created: DateTime<Utc>,
    pull_request: Option<DateTime<Utc>>,
    issue: Option<DateTime<Utc>>,
    commit: Option<DateTime<Utc>>,
) -> Edge<Fork> {
    let activity = |at: Option<DateTime<Utc>>| Nodes {
        nodes: at.map(|created_at| Activity { created_at }).into_iter().collect(),
    };
    Edge {
        node: Fork {
            created_at: created,
            pull_requests: activity(pull_request),
            issues: activity(issue),
            refs: Nodes {
                nodes: commit
                    .map(|committed_date| BranchTarget {
                        target: Some(CommitTarget {
                            history: Some(Edges {
                                edges: vec![Edge {
                                    node: CommitDate { committed_date },
                                }],
                            }),
                        }),
                    })
                    .into_iter()
                    .collect(),
            },
        },
    }
}

/// Issue data: one closed issue per entry of `days_open`, plus totals
pub fn issues(days_open: &[i64], total: u64, closed: u64) -> ResponsivenessRepository {
    ResponsivenessRepository {
        issues: Edges {
            edges: days_open
                .iter()
                .map(|&days| Edge {
                    node: ClosedIssue {
                        created_at: epoch(),
                        closed_at: Some(at(days, 3)),
                    },
                })
                .collect(),
        },
        all_issues: Count { total_count: total },
        total_closed_issues: Count {
            total_count: closed,
        },
    }
}

/// A license as GitHub reports it
pub fn license(spdx_id: &str, name: &str) -> LicenseInfo {
    LicenseInfo {
        key: Some(spdx_id.to_lowercase()),
        name: Some(name.to_string()),
        spdx_id: Some(spdx_id.to_string()),
        url: None,
    }
}
