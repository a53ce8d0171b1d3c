//! GraphQL documents sent to the GitHub API.

/// Aggregate counters for one account.
pub const USER_STATS: &str = r#"
query userInfo($login: String!) {
  user(login: $login) {
    name
    login
    contributionsCollection {
      totalCommitContributions
      restrictedContributionsCount
    }
    repositoriesContributedTo(contributionTypes: [COMMIT, ISSUE, PULL_REQUEST, REPOSITORY]) {
      totalCount
    }
    pullRequests {
      totalCount
    }
    openIssues: issues(states: OPEN) {
      totalCount
    }
    closedIssues: issues(states: CLOSED) {
      totalCount
    }
    followers {
      totalCount
    }
    repositories(ownerAffiliations: OWNER) {
      totalCount
    }
  }
}
"#;

/// One page of owned repositories, most starred first.
pub const STAR_REPOSITORIES: &str = r#"
query userInfo($login: String!, $first: Int!, $after: String) {
  user(login: $login) {
    repositories(first: $first, ownerAffiliations: OWNER, orderBy: {direction: DESC, field: STARGAZERS}, after: $after) {
      nodes {
        name
        stargazers {
          totalCount
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

/// Owned, non-fork repositories with their largest languages.
pub const TOP_LANGUAGES: &str = r#"
query userInfo($login: String!) {
  user(login: $login) {
    repositories(ownerAffiliations: OWNER, isFork: false, first: 100) {
      nodes {
        name
        languages(first: 10, orderBy: {field: SIZE, direction: DESC}) {
          edges {
            size
            node {
              color
              name
            }
          }
        }
      }
    }
  }
}
"#;
