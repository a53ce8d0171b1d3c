//! Percentile-based rank over aggregated totals.
//!
//! The score is a weighted sum of the totals pushed through a normal CDF, so
//! smaller values mean a higher percentile. The levels are cut at fixed
//! percentile boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

const COMMITS_WEIGHT: f64 = 1.65;
const CONTRIBUTIONS_WEIGHT: f64 = 1.65;
const ISSUES_WEIGHT: f64 = 1.0;
const STARS_WEIGHT: f64 = 0.75;
const PRS_WEIGHT: f64 = 0.5;
const FOLLOWERS_WEIGHT: f64 = 0.45;
const REPOS_WEIGHT: f64 = 1.0;

const ALL_WEIGHTS: f64 = COMMITS_WEIGHT
    + CONTRIBUTIONS_WEIGHT
    + ISSUES_WEIGHT
    + STARS_WEIGHT
    + PRS_WEIGHT
    + FOLLOWERS_WEIGHT
    + REPOS_WEIGHT;

/// Sum of the level boundaries (1 + 45 + 60 + 100).
const RANK_SIGMA: f64 = 206.0;

/// Letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankLevel {
    #[serde(rename = "S+")]
    SPlus,
    #[serde(rename = "S")]
    S,
    #[serde(rename = "A++")]
    APlusPlus,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "B+")]
    BPlus,
    /// Placeholder before a rank has been computed.
    #[serde(rename = "C")]
    C,
}

impl RankLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RankLevel::SPlus => "S+",
            RankLevel::S => "S",
            RankLevel::APlusPlus => "A++",
            RankLevel::APlus => "A+",
            RankLevel::BPlus => "B+",
            RankLevel::C => "C",
        }
    }

    fn from_percentile(percentile: f64) -> Self {
        if percentile < 1.0 {
            RankLevel::SPlus
        } else if percentile < 25.0 {
            RankLevel::S
        } else if percentile < 45.0 {
            RankLevel::APlusPlus
        } else if percentile < 60.0 {
            RankLevel::APlus
        } else {
            RankLevel::BPlus
        }
    }
}

impl fmt::Display for RankLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A letter grade with the percentile it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub level: RankLevel,
    pub score: f64,
}

impl Default for Rank {
    fn default() -> Self {
        Self {
            level: RankLevel::C,
            score: 0.0,
        }
    }
}

/// Inputs to [`calculate_rank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankInput {
    pub total_commits: u64,
    pub total_repos: u64,
    pub followers: u64,
    pub contributions: u64,
    pub stargazers: u64,
    pub prs: u64,
    pub issues: u64,
}

/// Compute the rank for a set of totals. Pure and deterministic.
pub fn calculate_rank(input: &RankInput) -> Rank {
    let score = (input.total_commits as f64 * COMMITS_WEIGHT
        + input.contributions as f64 * CONTRIBUTIONS_WEIGHT
        + input.issues as f64 * ISSUES_WEIGHT
        + input.stargazers as f64 * STARS_WEIGHT
        + input.prs as f64 * PRS_WEIGHT
        + input.followers as f64 * FOLLOWERS_WEIGHT
        + input.total_repos as f64 * REPOS_WEIGHT)
        / 100.0;

    let percentile = normal_cdf(score, RANK_SIGMA, ALL_WEIGHTS) * 100.0;

    Rank {
        level: RankLevel::from_percentile(percentile),
        score: percentile,
    }
}

/// Cumulative normal distribution at `to`, via the Abramowitz-Stegun erf
/// approximation (max error 1.5e-7).
fn normal_cdf(mean: f64, sigma: f64, to: f64) -> f64 {
    let z = (to - mean) / (2.0 * sigma * sigma).sqrt();
    let t = 1.0 / (1.0 + 0.327_591_1 * z.abs());
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let erf = 1.0 - ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t * (-z * z).exp();
    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    0.5 * (1.0 + sign * erf)
}
