use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::Serialize;

use super::catalog::RuleCatalog;
use super::domain::{Person, PersonId};
use super::record::BadgeRecord;
use super::reference::ReferenceData;
use super::rules::{BadgeRule, Candidate, RuleError, RuleInput};

/// A rule that aborted for one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub message: String,
}

/// Badges awarded to one person in catalog order, plus isolated rule failures.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub person_id: PersonId,
    pub badges: Vec<BadgeRecord>,
    pub failures: Vec<RuleFailure>,
}

impl Assignment {
    pub fn badge(&self, name: &str) -> Option<&BadgeRecord> {
        self.badges.iter().find(|badge| badge.name == name)
    }
}

/// Runs the full rule catalog against people.
pub struct AssignmentEngine {
    catalog: RuleCatalog,
    reference: Arc<ReferenceData>,
    pool: Option<ThreadPool>,
}

impl AssignmentEngine {
    pub fn new(catalog: RuleCatalog, reference: Arc<ReferenceData>) -> Self {
        Self {
            catalog,
            reference,
            pool: None,
        }
    }

    /// Run population passes on a dedicated pool instead of the global rayon pool.
    pub fn with_worker_threads(
        mut self,
        worker_threads: Option<usize>,
    ) -> Result<Self, ThreadPoolBuildError> {
        self.pool = match worker_threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("badge-worker-{index}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(self)
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Evaluate one rule, returning the awarded level and candidate if it applies.
    ///
    /// Leveled rules are tried from the highest threshold down; the first level that
    /// assigns wins.
    pub fn evaluate(
        &self,
        rule: &dyn BadgeRule,
        person: &Person,
    ) -> Result<Option<(u32, Candidate)>, RuleError> {
        let input = RuleInput::new(person, &self.reference);
        let definition = rule.definition();

        if !definition.is_leveled() {
            return Ok(rule.decide(&input)?.map(|candidate| (1, candidate)));
        }

        for level in definition.levels_descending() {
            if let Some(candidate) = rule.decide_at_threshold(&input, level.threshold)? {
                return Ok(Some((level.level, candidate)));
            }
        }
        Ok(None)
    }

    pub fn assign_all(&self, person: &Person) -> Assignment {
        let mut badges = Vec::new();
        let mut failures = Vec::new();

        for rule in self.catalog.all_rules() {
            match self.evaluate(rule, person) {
                Ok(Some((level, candidate))) => {
                    tracing::debug!(
                        person = %person.id.0,
                        badge = rule.name(),
                        level,
                        value = candidate.value,
                        "badge assigned"
                    );
                    badges.push(BadgeRecord::from_candidate(
                        person.id.clone(),
                        rule.definition(),
                        level,
                        candidate,
                    ));
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(
                        person = %person.id.0,
                        badge = rule.name(),
                        error = %err,
                        "badge rule aborted"
                    );
                    failures.push(RuleFailure {
                        rule: rule.name(),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            person = %person.id.0,
            products = person.products.len(),
            badges = badges.len(),
            failures = failures.len(),
            "badge assignment finished"
        );

        Assignment {
            person_id: person.id.clone(),
            badges,
            failures,
        }
    }

    /// Assign every person in parallel; output order matches `people`.
    pub fn assign_population(&self, people: &[Person]) -> Vec<Assignment> {
        let run = || -> Vec<Assignment> {
            people
                .par_iter()
                .map(|person| self.assign_all(person))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
