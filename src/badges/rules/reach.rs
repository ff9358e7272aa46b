use super::{BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};

/// Highest attention score earned by a single product.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigHit;

static BIG_HIT: BadgeDefinition = BadgeDefinition {
    name: "big_hit",
    display_name: "Big Hit",
    category: BadgeCategory::Reach,
    description: "You have a product with an Altmetric.com score of more than {value}.",
    importance: 0.9,
    is_for_products: true,
    levels: &[
        BadgeLevel::new(1, 3.0),
        BadgeLevel::new(2, 25.0),
        BadgeLevel::new(3, 50.0),
        BadgeLevel::new(4, 100.0),
        BadgeLevel::new(5, 250.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for BigHit {
    fn definition(&self) -> &'static BadgeDefinition {
        &BIG_HIT
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut best: Option<Candidate> = None;
        for product in input.products() {
            let score = product.altmetric_score();
            let current = best.as_ref().map(|candidate| candidate.value).unwrap_or(0.0);
            if score > current {
                let candidate = best.get_or_insert_with(Candidate::default);
                candidate.value = score;
                candidate.reset_products(product);
            }
        }

        Ok(best.filter(|candidate| candidate.value > threshold))
    }
}

/// Follower-weighted Twitter reach.
#[derive(Debug, Clone, Copy, Default)]
pub struct Impressions;

static IMPRESSIONS: BadgeDefinition = BadgeDefinition {
    name: "impressions",
    display_name: "You make an impression",
    category: BadgeCategory::Reach,
    description: "The number of twitter impressions your work would fill {value}!",
    importance: 0.91,
    is_for_products: false,
    levels: &[BadgeLevel::new(1, 100.0)],
    img_url: Some("https://en.wikipedia.org/wiki/File:Avery_fisher_hall.jpg"),
    credit: Some("Photo: Mikhail Klassen"),
    ..BadgeDefinition::BASE
};

impl BadgeRule for Impressions {
    fn definition(&self) -> &'static BadgeDefinition {
        &IMPRESSIONS
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let Some(impressions) = input.person.metrics.impressions else {
            return Ok(None);
        };

        let impressions = impressions as f64;
        if impressions > threshold {
            return Ok(Some(Candidate::new(impressions)));
        }
        Ok(None)
    }
}

/// Any online attention at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSteps;

static FIRST_STEPS: BadgeDefinition = BadgeDefinition {
    name: "first_steps",
    display_name: "First steps",
    category: BadgeCategory::Reach,
    description: "You have made online impact!  Congrats!",
    importance: 0.01,
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for FirstSteps {
    fn definition(&self) -> &'static BadgeDefinition {
        &FIRST_STEPS
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let has_impact = input
            .products()
            .iter()
            .any(|product| product.altmetric_score() > 0.0);
        Ok(has_impact.then(|| Candidate::new(1.0)))
    }
}
