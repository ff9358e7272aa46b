//! Badge assignment for researchers.
//!
//! The [`RuleCatalog`] holds every badge rule. The [`AssignmentEngine`] runs it against a
//! [`Person`] snapshot, and [`BadgeService`] persists the results and runs the percentile
//! pass over the stored population.

pub mod catalog;
pub mod definition;
pub mod domain;
pub mod engine;
pub mod percentile;
pub mod record;
pub mod reference;
pub mod rules;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::RuleCatalog;
pub use definition::{BadgeCategory, BadgeDefinition, BadgeLevel, RuleConfig};
pub use domain::{
    AudienceType, ClassifiedReview, MentionSource, PeerReview, Person, PersonId, PersonMetrics,
    Product, ProductId,
};
pub use engine::{Assignment, AssignmentEngine, RuleFailure};
pub use percentile::{percentile, ReferencePopulations};
pub use record::{sort_for_display, BadgeId, BadgeRecord, BadgeView, FUN_SORT_PENALTY};
pub use reference::{
    CountryInfo, CountryTable, NotableAccounts, PacificRim, ReferenceData, ReferenceDataError,
};
pub use rules::{BadgeRule, Candidate, RuleError, RuleInput, RuleOutcome};
pub use service::{BadgeService, BadgeServiceError, PersonFailure, PopulationSummary};
pub use store::{BadgeStore, InMemoryBadgeStore, StoreError};
