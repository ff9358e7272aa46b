use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::RuleCatalog;
use super::definition::{BadgeCategory, BadgeDefinition};
use super::domain::{PersonId, ProductId};
use super::percentile::percentile;
use super::rules::Candidate;

const BADGE_ID_LEN: usize = 10;
/// Subtracted from the sort score of fun badges so they rank below serious ones.
pub const FUN_SORT_PENALTY: f64 = 1.0;
/// Percentile above which the description congratulates the researcher.
const CONGRATS_PERCENTILE: f64 = 0.5;

/// Short random identifier for a badge record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BadgeId(pub String);

impl BadgeId {
    pub fn generate() -> Self {
        let mut raw = Uuid::new_v4().simple().to_string();
        raw.truncate(BADGE_ID_LEN);
        BadgeId(raw)
    }
}

/// An awarded badge for one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub id: BadgeId,
    pub person_id: PersonId,
    pub name: String,
    pub created: DateTime<Utc>,
    pub level: u32,
    pub value: f64,
    /// `None` until the population pass runs, or when no reference population exists.
    pub percentile: Option<f64>,
    pub support: Option<String>,
    pub products: BTreeSet<ProductId>,
}

impl BadgeRecord {
    pub fn from_candidate(
        person_id: PersonId,
        definition: &BadgeDefinition,
        level: u32,
        candidate: Candidate,
    ) -> Self {
        Self {
            id: BadgeId::generate(),
            person_id,
            name: definition.name.to_string(),
            created: Utc::now(),
            level,
            value: candidate.value,
            percentile: None,
            support: candidate.support,
            products: candidate.products,
        }
    }

    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    /// Rank this record's value within the sorted values of every holder of the badge.
    pub fn set_percentile(&mut self, sorted_population: &[f64]) {
        self.percentile = percentile(Some(self.value), sorted_population);
    }

    pub fn sort_score(&self, definition: &BadgeDefinition) -> f64 {
        let mut score = self.percentile.unwrap_or(0.0) * definition.importance;
        if definition.category == BadgeCategory::Fun {
            score -= FUN_SORT_PENALTY;
        }
        score
    }

    pub fn description(&self, definition: &BadgeDefinition) -> String {
        let mut description = definition
            .description
            .replace("{value}", &format!("{:.1}", self.value));

        if let Some(percentile) = self.percentile.filter(|p| *p > CONGRATS_PERCENTILE) {
            description = format!(
                "{} Congrats, that's more than {}% of researchers!",
                description,
                (100.0 * percentile).floor() as u32
            );
        }
        description
    }

    pub fn display_level(&self) -> u32 {
        self.level.div_ceil(2)
    }

    pub fn view(&self, catalog: &RuleCatalog) -> BadgeView {
        let definition = catalog.rule_by_name(&self.name).definition();
        BadgeView {
            id: self.id.clone(),
            name: self.name.clone(),
            created: self.created,
            num_products: self.num_products(),
            support: self.support.clone(),
            level: self.display_level(),
            value: self.value,
            percentile: self.percentile,
            sort_score: self.sort_score(definition),
            description: self.description(definition),
            extra_description: definition.extra_description,
            group: definition.category,
            display_name: definition.display_name,
            max_level: definition.max_level().div_ceil(2),
            is_for_products: definition.is_for_products,
        }
    }
}

/// Presentation payload for an awarded badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeView {
    pub id: BadgeId,
    pub name: String,
    pub created: DateTime<Utc>,
    pub num_products: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
    pub level: u32,
    pub value: f64,
    pub percentile: Option<f64>,
    pub sort_score: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_description: Option<&'static str>,
    pub group: BadgeCategory,
    pub display_name: &'static str,
    pub max_level: u32,
    pub is_for_products: bool,
}

/// Order views for display: highest sort score first.
pub fn sort_for_display(views: &mut [BadgeView]) {
    views.sort_by(|a, b| b.sort_score.total_cmp(&a.sort_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::definition::BadgeLevel;

    static HIT: BadgeDefinition = BadgeDefinition {
        name: "hit",
        category: BadgeCategory::Reach,
        description: "You have a product with a score of more than {value}.",
        importance: 0.9,
        levels: &[BadgeLevel::new(1, 3.0), BadgeLevel::new(2, 25.0), BadgeLevel::new(3, 50.0)],
        ..BadgeDefinition::BASE
    };

    static JOKE: BadgeDefinition = BadgeDefinition {
        name: "joke",
        category: BadgeCategory::Fun,
        ..BadgeDefinition::BASE
    };

    fn record(definition: &BadgeDefinition, value: f64) -> BadgeRecord {
        BadgeRecord::from_candidate(
            PersonId("0000-0070".to_string()),
            definition,
            1,
            Candidate::new(value),
        )
    }

    #[test]
    fn generated_ids_are_short_and_distinct() {
        let first = BadgeId::generate();
        let second = BadgeId::generate();
        assert_eq!(first.0.len(), 10);
        assert_ne!(first, second);
    }

    #[test]
    fn description_rounds_value_and_congratulates_top_half() {
        let mut badge = record(&HIT, 12.345);
        assert_eq!(
            badge.description(&HIT),
            "You have a product with a score of more than 12.3."
        );

        badge.percentile = Some(0.876);
        assert_eq!(
            badge.description(&HIT),
            "You have a product with a score of more than 12.3. Congrats, that's more than 87% of researchers!"
        );
    }

    #[test]
    fn fun_badges_rank_below_equal_serious_badges() {
        let mut serious = record(&HIT, 5.0);
        serious.percentile = Some(0.5);
        let mut fun = record(&JOKE, 5.0);
        fun.percentile = Some(0.5);

        assert!((serious.sort_score(&HIT) - 0.45).abs() < 1e-9);
        assert!((fun.sort_score(&JOKE) - (-0.5)).abs() < 1e-9);
    }

    #[test]
    fn display_levels_halve_rounding_up() {
        let mut badge = record(&HIT, 60.0);
        badge.level = 3;
        assert_eq!(badge.display_level(), 2);
        badge.level = 1;
        assert_eq!(badge.display_level(), 1);
    }

    #[test]
    fn set_percentile_uses_insertion_point() {
        let mut badge = record(&HIT, 3.0);
        badge.set_percentile(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(badge.percentile, Some(0.5));

        badge.set_percentile(&[]);
        assert_eq!(badge.percentile, None);
    }
}
