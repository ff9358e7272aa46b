use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for researchers (ORCID iD or equivalent).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub String);

/// Identifier wrapper for research products (DOI or equivalent).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Channels that upstream collectors tally mentions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionSource {
    News,
    Blogs,
    Twitter,
    Facebook,
    Wikipedia,
    PeerReviews,
}

impl MentionSource {
    pub const fn key(self) -> &'static str {
        match self {
            MentionSource::News => "news",
            MentionSource::Blogs => "blogs",
            MentionSource::Twitter => "twitter",
            MentionSource::Facebook => "facebook",
            MentionSource::Wikipedia => "wikipedia",
            MentionSource::PeerReviews => "peer_reviews",
        }
    }
}

/// Audience segments reported by the poster classification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceType {
    Scientists,
    Practitioners,
    ScienceCommunicators,
    Public,
}

impl AudienceType {
    pub const fn label(self) -> &'static str {
        match self {
            AudienceType::Scientists => "Scientists",
            AudienceType::Practitioners => {
                "Practitioners (doctors, other healthcare professionals)"
            }
            AudienceType::ScienceCommunicators => {
                "Science communicators (journalists, bloggers, editors)"
            }
            AudienceType::Public => "Members of the public",
        }
    }
}

/// Third-party (F1000) review with the classification tags the reviewer applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    pub url: String,
    #[serde(default)]
    pub classes: BTreeSet<String>,
}

/// Publons peer-review record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerReview {
    pub url: String,
    #[serde(default)]
    pub weighted_average: Option<f64>,
}

/// Snapshot of one research output and the attention metrics collected for it.
///
/// Every metric may be missing upstream; absent maps and lists deserialize as empty and
/// contribute nothing to any rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub year: Option<i32>,
    pub altmetric_score: Option<f64>,
    /// Mention counts keyed by source (`news`, `twitter`, ...).
    pub post_counts: BTreeMap<String, u64>,
    /// Geo-located mention counts keyed by ISO country code.
    pub post_counts_by_country: BTreeMap<String, u64>,
    /// Days between publication and each mention, keyed by source.
    pub event_days_since_publication: BTreeMap<String, Vec<i64>>,
    /// Days between each mention and today, keyed by source.
    pub event_days_ago: BTreeMap<String, Vec<i64>>,
    /// Twitter handle to follower count.
    pub twitter_posters: BTreeMap<String, u64>,
    pub twitter_poster_names: Vec<String>,
    /// Poster counts keyed by audience label.
    pub poster_counts_by_type: BTreeMap<String, u64>,
    pub f1000_reviews: Vec<ClassifiedReview>,
    pub publons_reviews: Vec<PeerReview>,
    pub impact_urls: BTreeSet<String>,
    /// Language code to an example mention URL.
    pub languages_with_examples: BTreeMap<String, String>,
    pub wikipedia_urls: Vec<String>,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProductId(id.into()),
            ..Self::default()
        }
    }

    pub fn post_count(&self, source: MentionSource) -> u64 {
        self.post_counts.get(source.key()).copied().unwrap_or(0)
    }

    pub fn has_source(&self, source: MentionSource) -> bool {
        self.post_count(source) > 0
    }

    pub fn altmetric_score(&self) -> f64 {
        self.altmetric_score.unwrap_or(0.0)
    }

    pub fn audience_count(&self, audience: AudienceType) -> u64 {
        self.poster_counts_by_type
            .get(audience.label())
            .copied()
            .unwrap_or(0)
    }

    pub fn classified_audience_total(&self) -> u64 {
        self.poster_counts_by_type.values().sum()
    }

    pub fn review_urls_for_class(&self, class: &str) -> Vec<&str> {
        self.f1000_reviews
            .iter()
            .filter(|review| review.classes.contains(class))
            .map(|review| review.url.as_str())
            .collect()
    }

    pub fn dated_event_count(&self) -> usize {
        self.event_days_since_publication
            .values()
            .map(|days| days.len())
            .sum()
    }
}

/// Person-level metrics computed upstream that are not derivable from the products.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonMetrics {
    /// Follower-weighted Twitter reach across all products.
    pub impressions: Option<u64>,
    /// Software-reuse percentile reported by Depsy, in `[0, 1]`.
    pub depsy_percentile: Option<f64>,
    pub depsy_id: Option<String>,
}

/// Researcher snapshot consumed read-only by the rule catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub metrics: PersonMetrics,
}

impl Person {
    pub fn new(id: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            id: PersonId(id.into()),
            products,
            metrics: PersonMetrics::default(),
        }
    }

    pub fn post_count(&self, source: MentionSource) -> u64 {
        self.products
            .iter()
            .map(|product| product.post_count(source))
            .sum()
    }

    pub fn wikipedia_urls(&self) -> BTreeSet<&str> {
        self.products
            .iter()
            .flat_map(|product| product.wikipedia_urls.iter().map(String::as_str))
            .collect()
    }

    /// Every "days ago" offset across products, regardless of source.
    pub fn all_event_days_ago(&self) -> impl Iterator<Item = i64> + '_ {
        self.products
            .iter()
            .flat_map(|product| product.event_days_ago.values())
            .flat_map(|days| days.iter().copied())
    }
}
