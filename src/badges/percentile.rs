use std::collections::BTreeMap;

use super::record::BadgeRecord;

/// Fraction of `sorted_population` strictly below `value`.
///
/// Uses the leftmost insertion point, so values absent from the population still rank
/// monotonically. Returns `None` for a missing value or an empty population.
pub fn percentile(value: Option<f64>, sorted_population: &[f64]) -> Option<f64> {
    let value = value?;
    if sorted_population.is_empty() || value.is_nan() {
        return None;
    }

    let rank = sorted_population.partition_point(|candidate| *candidate < value);
    Some(rank as f64 / sorted_population.len() as f64)
}

/// Sorted badge values per badge name, materialised from a full assignment pass.
#[derive(Debug, Clone, Default)]
pub struct ReferencePopulations {
    values: BTreeMap<String, Vec<f64>>,
}

impl ReferencePopulations {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a BadgeRecord>,
    {
        let mut values: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in records {
            if record.value.is_nan() {
                continue;
            }
            values
                .entry(record.name.clone())
                .or_default()
                .push(record.value);
        }
        for population in values.values_mut() {
            population.sort_by(|a, b| a.total_cmp(b));
        }
        Self { values }
    }

    pub fn population(&self, badge_name: &str) -> &[f64] {
        self.values
            .get(badge_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Attach percentiles to `records`, returning how many received one.
    pub fn apply(&self, records: &mut [BadgeRecord]) -> usize {
        let mut assigned = 0;
        for record in records.iter_mut() {
            let population = self.population(&record.name);
            record.set_percentile(population);
            match record.percentile {
                Some(_) => assigned += 1,
                None => tracing::warn!(
                    badge = %record.name,
                    person = %record.person_id.0,
                    "no reference population for badge; percentile left unset"
                ),
            }
        }
        assigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_has_no_percentile() {
        assert_eq!(percentile(None, &[1.0, 2.0, 3.0]), None);
        assert_eq!(percentile(None, &[]), None);
    }

    #[test]
    fn zero_value_is_distinct_from_missing() {
        assert_eq!(percentile(Some(0.0), &[0.0, 1.0]), Some(0.0));
    }

    #[test]
    fn percentile_is_monotonic() {
        let population = [1.0, 2.0, 3.0, 4.0, 5.0];
        let low = percentile(Some(1.0), &population).expect("defined");
        let mid = percentile(Some(3.0), &population).expect("defined");
        let high = percentile(Some(5.0), &population).expect("defined");
        assert!(low <= mid && mid <= high);
        assert_eq!(low, 0.0);
        assert_eq!(mid, 0.4);
        assert_eq!(high, 0.8);
    }

    #[test]
    fn ties_resolve_to_leftmost_position() {
        assert_eq!(percentile(Some(2.0), &[1.0, 2.0, 2.0, 2.0]), Some(0.25));
    }

    #[test]
    fn values_outside_population_are_still_ranked() {
        let population = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(Some(25.0), &population), Some(0.5));
        assert_eq!(percentile(Some(99.0), &population), Some(1.0));
        assert_eq!(percentile(Some(1.0), &population), Some(0.0));
    }

    #[test]
    fn empty_population_is_undefined() {
        assert_eq!(percentile(Some(3.0), &[]), None);
    }
}
