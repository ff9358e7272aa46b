use std::collections::BTreeSet;

use super::{BadgeRule, Candidate, RuleError, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};
use crate::badges::reference;

/// Countries needed on each side of the Pacific.
const PACIFIC_RIM_MIN_PER_SIDE: usize = 3;

/// Number of distinct countries the research reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalReach;

static GLOBAL_REACH: BadgeDefinition = BadgeDefinition {
    name: "global_reach",
    display_name: "Global reach",
    category: BadgeCategory::Geo,
    description: "Your research has made an impact in more than {value} countries",
    importance: 0.85,
    is_for_products: false,
    levels: &[
        BadgeLevel::new(1, 1.0),
        BadgeLevel::new(2, 2.0),
        BadgeLevel::new(3, 3.0),
        BadgeLevel::new(4, 5.0),
        BadgeLevel::new(5, 10.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for GlobalReach {
    fn definition(&self) -> &'static BadgeDefinition {
        &GLOBAL_REACH
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut countries: BTreeSet<&str> = BTreeSet::new();
        let mut candidate = Candidate::default();

        for product in input.products() {
            let mut touched = false;
            for country in input.country_names(product) {
                countries.insert(country);
                touched = true;
            }
            if touched {
                candidate.add_product(product);
            }
        }

        let count = countries.len() as f64;
        if count <= threshold {
            return Ok(None);
        }

        candidate.value = count;
        candidate.support = Some(format!(
            "Countries include: {}.",
            countries.into_iter().collect::<Vec<_>>().join(", ")
        ));
        Ok(Some(candidate))
    }
}

/// Share of geo-located attention coming from the Global South.
///
/// A canonical country missing from the classification table is a data-integrity bug and
/// aborts this rule with [`RuleError::UnclassifiedCountry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSouth;

static GLOBAL_SOUTH: BadgeDefinition = BadgeDefinition {
    name: "global_south",
    display_name: "Global South",
    category: BadgeCategory::Geo,
    description: "More than {value}% of your impact is from the Global South.",
    importance: 0.5,
    is_for_products: true,
    levels: &[BadgeLevel::new(1, 0.001)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for GlobalSouth {
    fn definition(&self) -> &'static BadgeDefinition {
        &GLOBAL_SOUTH
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let table = &input.reference.countries;
        let mut candidate = Candidate::default();
        let mut countries: BTreeSet<&str> = BTreeSet::new();
        let mut geolocated = 0u64;
        let mut global_south = 0u64;

        for product in input.products() {
            for (iso, count) in &product.post_counts_by_country {
                geolocated += count;
                let Some(name) = table.name_for_iso(iso) else {
                    tracing::debug!(
                        iso = %iso,
                        product = %product.id.0,
                        "skipping country code missing from the ISO table"
                    );
                    continue;
                };
                let info = table
                    .info(name)
                    .ok_or_else(|| RuleError::UnclassifiedCountry {
                        country: name.to_string(),
                    })?;
                if info.is_global_south {
                    global_south += count;
                    candidate.add_product(product);
                    countries.insert(name);
                }
            }
        }

        if geolocated == 0 {
            return Ok(None);
        }

        let ratio = global_south as f64 / geolocated as f64;
        if ratio <= threshold {
            return Ok(None);
        }

        candidate.value = 100.0 * ratio;
        candidate.support = Some(format!(
            "Impact from these Global South countries: {}.",
            countries.into_iter().collect::<Vec<_>>().join(", ")
        ));
        Ok(Some(candidate))
    }
}

/// Attention from both sides of the Pacific Rim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacificRim;

static PACIFIC_RIM: BadgeDefinition = BadgeDefinition {
    name: "pacific_rim",
    display_name: "Pacific rim",
    category: BadgeCategory::Geo,
    description: "You have impact from at least three eastern Pacific Rim and three western Pacific Rim countries.",
    importance: 0.2,
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for PacificRim {
    fn definition(&self) -> &'static BadgeDefinition {
        &PACIFIC_RIM
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let table = &input.reference.countries;
        let mut candidate = Candidate::default();
        let mut countries: Vec<&str> = Vec::new();

        let mut reached_per_side = [0usize; 2];
        for (slot, side) in [reference::PacificRim::West, reference::PacificRim::East]
            .into_iter()
            .enumerate()
        {
            for country in table.pacific_rim(side) {
                let mut matched = false;
                for product in input.products() {
                    if input.has_country(product, country) {
                        candidate.add_product(product);
                        matched = true;
                    }
                }
                if matched {
                    reached_per_side[slot] += 1;
                    countries.push(country);
                }
            }
        }

        if reached_per_side
            .iter()
            .all(|reached| *reached >= PACIFIC_RIM_MIN_PER_SIDE)
        {
            candidate.value = 1.0;
            candidate.support = Some(format!(
                "Impact from these Pacific Rim countries: {}.",
                countries.join(", ")
            ));
            return Ok(Some(candidate));
        }
        Ok(None)
    }
}
