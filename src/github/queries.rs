//! GraphQL documents sent to the GitHub v4 API.

/// Checks that the token identifies a user
pub const VALIDATE_TOKEN: &str = r#"
query {
  viewer {
    login
  }
}
"#;

/// Structured license of a repository
pub const GET_VALUES_FOR_LICENSE: &str = r#"
query getLicenseInfo($repoOwner: String!, $repoName: String!) {
  repository(owner: $repoOwner, name: $repoName) {
    licenseInfo {
      key
      name
      spdxId
      url
    }
  }
}
"#;

/// Fork activity samples plus README/CONTRIBUTING presence
pub const GET_VALUES_FOR_RAMP_UP: &str = r#"
query getForksAndPRs($repoOwner: String!, $repoName: String!, $firstForks: Int!) {
  repository(owner: $repoOwner, name: $repoName) {
    forks(first: $firstForks) {
      edges {
        node {
          createdAt
          pullRequests(first: 1) {
            nodes {
              createdAt
            }
          }
          issues(first: 1) {
            nodes {
              createdAt
            }
          }
          refs(refPrefix: "refs/heads/", first: 1) {
            nodes {
              target {
                ... on Commit {
                  history(first: 1) {
                    edges {
                      node {
                        committedDate
                      }
                    }
                  }
                }
              }
            }
          }
        }
      }
    }
    readme: object(expression: "HEAD:README.md") {
      ... on Blob {
        id
      }
    }
    contributing: object(expression: "HEAD:CONTRIBUTING.md") {
      ... on Blob {
        id
      }
    }
  }
}
"#;

/// Closed issue timings and issue totals
pub const GET_VALUES_FOR_RESPONSIVE_MAINTAINER: &str = r#"
query getRepoData($repoOwner: String!, $repoName: String!, $firstIssues: Int!) {
  repository(owner: $repoOwner, name: $repoName) {
    issues(first: $firstIssues, states: CLOSED) {
      edges {
        node {
          createdAt
          closedAt
        }
      }
    }
    allIssues: issues {
      totalCount
    }
    totalClosedIssues: issues(states: CLOSED) {
      totalCount
    }
  }
}
"#;

/// One page of default-branch history since a timestamp
pub const GET_VALUES_FOR_BUS_FACTOR: &str = r#"
query getCommits($repoOwner: String!, $repoName: String!, $since: GitTimestamp!, $first: Int!, $after: String) {
  repository(owner: $repoOwner, name: $repoName) {
    defaultBranchRef {
      target {
        ... on Commit {
          history(since: $since, first: $first, after: $after) {
            edges {
              node {
                author {
                  user {
                    login
                  }
                }
                committedDate
              }
            }
            pageInfo {
              endCursor
              hasNextPage
            }
          }
        }
      }
    }
  }
}
"#;
