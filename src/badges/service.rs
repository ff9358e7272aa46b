use std::sync::Arc;

use serde::Serialize;

use super::catalog::RuleCatalog;
use super::domain::{Person, PersonId};
use super::engine::{Assignment, AssignmentEngine, RuleFailure};
use super::percentile::ReferencePopulations;
use super::record::{sort_for_display, BadgeView};
use super::store::{BadgeStore, StoreError};

/// Service composing the assignment engine, the badge store, and the percentile pass.
pub struct BadgeService<S> {
    engine: Arc<AssignmentEngine>,
    store: Arc<S>,
}

/// Outcome of assigning a batch of people.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PopulationSummary {
    pub people: usize,
    pub badges: usize,
    pub percentiles: usize,
    pub failures: Vec<PersonFailure>,
}

/// Rule failures recorded for one person during a population run.
#[derive(Debug, Clone, Serialize)]
pub struct PersonFailure {
    pub person_id: PersonId,
    pub failures: Vec<RuleFailure>,
}

impl<S> BadgeService<S>
where
    S: BadgeStore + 'static,
{
    pub fn new(engine: Arc<AssignmentEngine>, store: Arc<S>) -> Self {
        Self { engine, store }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.engine.catalog()
    }

    /// Assign every rule to `person` and replace their stored badge set.
    pub fn refresh_person(&self, person: &Person) -> Result<Assignment, BadgeServiceError> {
        let assignment = self.engine.assign_all(person);
        self.store
            .replace_for_person(&assignment.person_id, assignment.badges.clone())?;
        Ok(assignment)
    }

    /// Assign a whole population, persist per person, then rerun the percentile pass.
    pub fn refresh_population(
        &self,
        people: &[Person],
    ) -> Result<PopulationSummary, BadgeServiceError> {
        let assignments = self.engine.assign_population(people);

        let mut summary = PopulationSummary {
            people: assignments.len(),
            ..PopulationSummary::default()
        };
        for assignment in assignments {
            summary.badges += assignment.badges.len();
            self.store
                .replace_for_person(&assignment.person_id, assignment.badges)?;
            if !assignment.failures.is_empty() {
                summary.failures.push(PersonFailure {
                    person_id: assignment.person_id,
                    failures: assignment.failures,
                });
            }
        }

        summary.percentiles = self.refresh_percentiles()?;

        tracing::info!(
            people = summary.people,
            badges = summary.badges,
            percentiles = summary.percentiles,
            people_with_failures = summary.failures.len(),
            "population refresh finished"
        );
        Ok(summary)
    }

    /// Recompute every stored percentile against the current store contents.
    pub fn refresh_percentiles(&self) -> Result<usize, BadgeServiceError> {
        let mut records = self.store.all()?;
        let populations = ReferencePopulations::from_records(records.iter());
        let assigned = populations.apply(&mut records);

        let updates: Vec<_> = records
            .into_iter()
            .map(|record| (record.id, record.percentile))
            .collect();
        self.store.update_percentiles(&updates)?;
        Ok(assigned)
    }

    /// Stored badges for a person, ready for display.
    pub fn profile(&self, person_id: &PersonId) -> Result<Vec<BadgeView>, BadgeServiceError> {
        let catalog = self.engine.catalog();
        let mut views: Vec<BadgeView> = self
            .store
            .badges_for_person(person_id)?
            .iter()
            .map(|record| record.view(catalog))
            .collect();
        sort_for_display(&mut views);
        Ok(views)
    }
}

/// Error raised by the badge service.
#[derive(Debug, thiserror::Error)]
pub enum BadgeServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
