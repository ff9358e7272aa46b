//! Badge rule catalog entries.
//!
//! Each rule is a stateless unit struct. Evaluation reads a [`RuleInput`] and returns a
//! fresh [`Candidate`] when the badge applies, so a rule instance can be shared freely
//! across threads and people.

mod audience;
mod channels;
mod fun;
mod geo;
mod merit;
mod reach;
mod timeline;

use std::collections::BTreeSet;

pub use audience::{Babel, IvoryTower, Megafan, PracticalMagic, PressPass, SpecialInterests};
pub use channels::{DeepInterest, Depsy, WikiHit};
pub use fun::{is_richard, BigInJapan, Bff, Controversial, FamousFollower, RickRoll, UrlSoup};
pub use geo::{GlobalReach, GlobalSouth, PacificRim};
pub use merit::{GoodForTeaching, Publons};
pub use reach::{BigHit, FirstSteps, Impressions};
pub use timeline::{
    consecutive_active_buckets, CleanSweep, HotStreak, LongLegs, SleepingBeauty, STREAK_BUCKET_DAYS,
};

use super::definition::BadgeDefinition;
use super::domain::{AudienceType, Person, Product, ProductId};
use super::reference::ReferenceData;

/// Read-only snapshot handed to every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub person: &'a Person,
    pub reference: &'a ReferenceData,
}

impl<'a> RuleInput<'a> {
    pub fn new(person: &'a Person, reference: &'a ReferenceData) -> Self {
        Self { person, reference }
    }

    pub fn products(&self) -> &'a [Product] {
        &self.person.products
    }

    /// Canonical country names this product was mentioned from. Unknown ISO codes are skipped.
    pub fn country_names(&self, product: &'a Product) -> impl Iterator<Item = &'a str> + 'a {
        let reference = self.reference;
        let countries = &reference.countries;
        product
            .post_counts_by_country
            .keys()
            .filter_map(move |iso| {
                let name = countries.name_for_iso(iso);
                if name.is_none() {
                    tracing::debug!(
                        iso = %iso,
                        product = %product.id.0,
                        "skipping country code missing from the ISO table"
                    );
                }
                name
            })
    }

    pub fn has_country(&self, product: &Product, name: &str) -> bool {
        product
            .post_counts_by_country
            .keys()
            .any(|iso| self.reference.countries.name_for_iso(iso) == Some(name))
    }
}

/// Outcome of a rule that decided the badge applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Candidate {
    pub value: f64,
    pub support: Option<String>,
    pub products: BTreeSet<ProductId>,
}

impl Candidate {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn with_support(mut self, support: impl Into<String>) -> Self {
        self.support = Some(support.into());
        self
    }

    pub fn with_products<'p, I>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = &'p Product>,
    {
        self.add_products(products);
        self
    }

    pub fn add_product(&mut self, product: &Product) {
        self.products.insert(product.id.clone());
    }

    pub fn add_products<'p, I>(&mut self, products: I)
    where
        I: IntoIterator<Item = &'p Product>,
    {
        for product in products {
            self.add_product(product);
        }
    }

    /// Drop every contributing product and keep only `product`.
    pub fn reset_products(&mut self, product: &Product) {
        self.products.clear();
        self.add_product(product);
    }
}

/// Evaluation failures that must surface instead of silently skipping the badge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("country '{country}' is missing from the classification table")]
    UnclassifiedCountry { country: String },
}

pub type RuleOutcome = Result<Option<Candidate>, RuleError>;

/// Contract shared by every catalog entry.
///
/// Leveled rules implement [`BadgeRule::decide_at_threshold`]; pass/fail rules implement
/// [`BadgeRule::decide`]. The engine picks the protocol from the definition's levels.
pub trait BadgeRule: Send + Sync {
    fn definition(&self) -> &'static BadgeDefinition;

    fn name(&self) -> &'static str {
        self.definition().name
    }

    fn is_valid(&self) -> bool {
        self.definition().is_valid
    }

    fn decide_at_threshold(&self, _input: &RuleInput<'_>, _threshold: f64) -> RuleOutcome {
        Ok(None)
    }

    fn decide(&self, _input: &RuleInput<'_>) -> RuleOutcome {
        Ok(None)
    }
}

/// Placeholder returned for unknown rule names; never assigns anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidRule;

static INVALID_RULE: BadgeDefinition = BadgeDefinition {
    name: "invalid",
    display_name: "Unknown badge",
    is_valid: false,
    importance: 0.0,
    ..BadgeDefinition::BASE
};

impl BadgeRule for InvalidRule {
    fn definition(&self) -> &'static BadgeDefinition {
        &INVALID_RULE
    }
}

/// Share of all classified posters that belong to `audiences`, across every product.
///
/// Returns 0 when no poster has been classified.
pub(crate) fn audience_proportion(person: &Person, audiences: &[AudienceType]) -> f64 {
    let mut total = 0u64;
    let mut matching = 0u64;
    for product in &person.products {
        total += product.classified_audience_total();
        matching += audiences
            .iter()
            .map(|audience| product.audience_count(*audience))
            .sum::<u64>();
    }

    if total == 0 {
        return 0.0;
    }
    matching as f64 / total as f64
}

pub(crate) fn twitter_links<'a, I>(handles: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    handles
        .into_iter()
        .map(|handle| format!("<a href='http://twitter.com/{handle}'>@{handle}</a>"))
        .collect::<Vec<_>>()
        .join(",")
}
