use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::PersonId;
use super::record::{BadgeId, BadgeRecord};

/// Storage abstraction so the service can be exercised in isolation.
pub trait BadgeStore: Send + Sync {
    /// Replace a person's badge set; a re-assigned badge keeps one record per name.
    fn replace_for_person(
        &self,
        person_id: &PersonId,
        badges: Vec<BadgeRecord>,
    ) -> Result<(), StoreError>;
    fn badges_for_person(&self, person_id: &PersonId) -> Result<Vec<BadgeRecord>, StoreError>;
    fn all(&self) -> Result<Vec<BadgeRecord>, StoreError>;
    fn update_percentile(&self, id: &BadgeId, percentile: Option<f64>) -> Result<(), StoreError>;

    /// Apply a whole percentile pass, returning how many records were updated.
    fn update_percentiles(&self, updates: &[(BadgeId, Option<f64>)]) -> Result<usize, StoreError> {
        for (id, percentile) in updates {
            self.update_percentile(id, *percentile)?;
        }
        Ok(updates.len())
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("badge not found")]
    NotFound,
    #[error("badge store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<PersonId, BTreeMap<String, BadgeRecord>>,
    /// Badge id to the (person, badge name) slot holding it.
    locations: BTreeMap<BadgeId, (PersonId, String)>,
}

impl StoreState {
    fn record_mut(&mut self, id: &BadgeId) -> Option<&mut BadgeRecord> {
        let (person_id, name) = self.locations.get(id)?;
        self.records.get_mut(person_id)?.get_mut(name)
    }
}

/// Process-local store keyed by person, then badge name.
#[derive(Debug, Default)]
pub struct InMemoryBadgeStore {
    state: Mutex<StoreState>,
}

impl InMemoryBadgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl BadgeStore for InMemoryBadgeStore {
    fn replace_for_person(
        &self,
        person_id: &PersonId,
        badges: Vec<BadgeRecord>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let by_name: BTreeMap<String, BadgeRecord> = badges
            .into_iter()
            .map(|badge| (badge.name.clone(), badge))
            .collect();

        if let Some(previous) = state.records.remove(person_id) {
            for record in previous.values() {
                state.locations.remove(&record.id);
            }
        }
        for (name, record) in &by_name {
            state
                .locations
                .insert(record.id.clone(), (person_id.clone(), name.clone()));
        }
        state.records.insert(person_id.clone(), by_name);
        Ok(())
    }

    fn badges_for_person(&self, person_id: &PersonId) -> Result<Vec<BadgeRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .records
            .get(person_id)
            .map(|by_name| by_name.values().cloned().collect())
            .unwrap_or_default())
    }

    fn all(&self) -> Result<Vec<BadgeRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .records
            .values()
            .flat_map(|by_name| by_name.values().cloned())
            .collect())
    }

    fn update_percentile(&self, id: &BadgeId, percentile: Option<f64>) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state.record_mut(id).ok_or(StoreError::NotFound)?;
        record.percentile = percentile;
        Ok(())
    }

    fn update_percentiles(&self, updates: &[(BadgeId, Option<f64>)]) -> Result<usize, StoreError> {
        let mut state = self.lock()?;
        for (id, percentile) in updates {
            let record = state.record_mut(id).ok_or(StoreError::NotFound)?;
            record.percentile = *percentile;
        }
        Ok(updates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::definition::BadgeDefinition;
    use crate::badges::rules::Candidate;

    static FIRST: BadgeDefinition = BadgeDefinition {
        name: "first",
        ..BadgeDefinition::BASE
    };

    fn badge(person: &str, value: f64) -> BadgeRecord {
        BadgeRecord::from_candidate(
            PersonId(person.to_string()),
            &FIRST,
            1,
            Candidate::new(value),
        )
    }

    #[test]
    fn replacing_keeps_one_record_per_badge_name() {
        let store = InMemoryBadgeStore::new();
        let person = PersonId("0000-0001".to_string());

        store
            .replace_for_person(&person, vec![badge("0000-0001", 1.0)])
            .expect("stored");
        store
            .replace_for_person(&person, vec![badge("0000-0001", 2.0), badge("0000-0001", 3.0)])
            .expect("stored");

        let stored = store.badges_for_person(&person).expect("fetch");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, 3.0);
    }

    #[test]
    fn unknown_person_has_no_badges() {
        let store = InMemoryBadgeStore::new();
        let stored = store
            .badges_for_person(&PersonId("missing".to_string()))
            .expect("fetch");
        assert!(stored.is_empty());
    }

    #[test]
    fn percentile_updates_target_a_single_record() {
        let store = InMemoryBadgeStore::new();
        let first = badge("0000-0001", 1.0);
        let second = badge("0000-0002", 2.0);
        let id = second.id.clone();
        store
            .replace_for_person(&first.person_id.clone(), vec![first])
            .expect("stored");
        store
            .replace_for_person(&second.person_id.clone(), vec![second])
            .expect("stored");

        store.update_percentile(&id, Some(0.5)).expect("updated");

        let all = store.all().expect("all");
        let updated: Vec<_> = all.iter().filter(|record| record.percentile.is_some()).collect();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, id);

        let missing = store.update_percentile(&BadgeId("nope".to_string()), Some(0.1));
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[test]
    fn replaced_badges_are_no_longer_addressable() {
        let store = InMemoryBadgeStore::new();
        let person = PersonId("0000-0001".to_string());
        let stale = badge("0000-0001", 1.0);
        let stale_id = stale.id.clone();
        store
            .replace_for_person(&person, vec![stale])
            .expect("stored");
        store
            .replace_for_person(&person, vec![badge("0000-0001", 2.0)])
            .expect("stored");

        let result = store.update_percentile(&stale_id, Some(0.3));
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn bulk_percentile_updates_reach_every_record() {
        let store = InMemoryBadgeStore::new();
        let mut updates = Vec::new();
        for index in 0..500 {
            let record = badge(&format!("0000-{index:04}"), index as f64);
            updates.push((record.id.clone(), Some(index as f64 / 500.0)));
            store
                .replace_for_person(&record.person_id.clone(), vec![record])
                .expect("stored");
        }

        let updated = store.update_percentiles(&updates).expect("bulk update");
        assert_eq!(updated, 500);

        let all = store.all().expect("all");
        assert_eq!(all.len(), 500);
        for record in all {
            assert_eq!(record.percentile, Some(record.value / 500.0));
        }

        let missing = store.update_percentiles(&[(BadgeId("nope".to_string()), None)]);
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }
}
