//! Identity Matcher
//!
//! Finds the remote resource a partial declaration refers to. Matching is an
//! exact string comparison and the first candidate that matches wins.

use super::model::ResourceKind;
use crate::error::{Error, Result};
use crate::heroku::addons::Addon;
use crate::heroku::drains::LogDrain;

/// Kind-specific match predicate
pub trait MatchPolicy {
    type Candidate;

    /// Name of the identity-bearing field, for error messages
    const FIELD: &'static str;

    /// Value being matched against
    fn key(&self) -> &str;

    fn matches(&self, candidate: &Self::Candidate) -> bool;
}

/// First candidate accepted by the policy
pub fn find_match<'c, P: MatchPolicy>(
    candidates: &'c [P::Candidate],
    policy: &P,
) -> Option<&'c P::Candidate> {
    candidates.iter().find(|candidate| policy.matches(candidate))
}

/// Matches add-ons by exact plan name
#[derive(Debug, Clone, Copy)]
pub struct PlanMatch<'a> {
    plan: &'a str,
}

impl<'a> PlanMatch<'a> {
    pub fn new(plan: &'a str) -> Self {
        Self { plan }
    }
}

impl MatchPolicy for PlanMatch<'_> {
    type Candidate = Addon;
    const FIELD: &'static str = "plan";

    fn key(&self) -> &str {
        self.plan
    }

    fn matches(&self, candidate: &Addon) -> bool {
        candidate.plan.name == self.plan
    }
}

/// Matches log drains by exact URL
#[derive(Debug, Clone, Copy)]
pub struct UrlMatch<'a> {
    url: &'a str,
}

impl<'a> UrlMatch<'a> {
    pub fn new(url: &'a str) -> Self {
        Self { url }
    }
}

impl MatchPolicy for UrlMatch<'_> {
    type Candidate = LogDrain;
    const FIELD: &'static str = "url";

    fn key(&self) -> &str {
        self.url
    }

    fn matches(&self, candidate: &LogDrain) -> bool {
        candidate.url == self.url
    }
}

/// What adopting does when no candidate matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMiss {
    /// A miss is an error
    Fail,
    /// A miss adopts nothing
    Ignore,
}

impl OnMiss {
    /// Apply this policy to the outcome of a match
    pub fn resolve<'c, P: MatchPolicy>(
        self,
        kind: ResourceKind,
        policy: &P,
        found: Option<&'c P::Candidate>,
    ) -> Result<Option<&'c P::Candidate>> {
        match (found, self) {
            (Some(candidate), _) => Ok(Some(candidate)),
            (None, OnMiss::Ignore) => Ok(None),
            (None, OnMiss::Fail) => Err(Error::NotMatched {
                kind,
                field: P::FIELD,
                key: policy.key().to_string(),
            }),
        }
    }
}
