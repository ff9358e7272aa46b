use super::{BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};
use crate::badges::domain::MentionSource;

/// Products published before this year are outside the deep-interest window.
const DEEP_INTEREST_SINCE_YEAR: i32 = 2012;
/// Minimum combined long-form and short-form mentions before the ratio counts.
const DEEP_INTEREST_MIN_POSTS: f64 = 10.0;

/// Research software reuse reported by Depsy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Depsy;

static DEPSY: BadgeDefinition = BadgeDefinition {
    name: "depsy",
    display_name: "Software reuse",
    category: BadgeCategory::Channels,
    description: "Your software impact is in the top {value} percent of all research software creators on Depsy",
    importance: 0.8,
    is_for_products: false,
    levels: &[BadgeLevel::new(1, 0.01)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for Depsy {
    fn definition(&self) -> &'static BadgeDefinition {
        &DEPSY
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let metrics = &input.person.metrics;
        let Some(percentile) = metrics.depsy_percentile else {
            return Ok(None);
        };
        if percentile <= threshold {
            return Ok(None);
        }

        let depsy_id = metrics.depsy_id.as_deref().unwrap_or_default();
        let support = format!(
            "You are in the {} percentile <a href='http://depsy.org/person/{}'>on Depsy</a>.",
            (percentile * 100.0).round(),
            depsy_id
        );
        Ok(Some(Candidate::new(percentile).with_support(support)))
    }
}

/// Mentions in Wikipedia articles.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiHit;

static WIKI_HIT: BadgeDefinition = BadgeDefinition {
    name: "wiki_hit",
    display_name: "Wiki hit",
    category: BadgeCategory::Channels,
    description: "Your research is mentioned in {value} Wikipedia articles!",
    extra_description: Some("Wikipedia is referenced by <a href='http://www.theatlantic.com/health/archive/2014/03/doctors-1-source-for-healthcare-information-wikipedia/284206/'>half of doctors!</a>"),
    importance: 0.9,
    is_for_products: false,
    levels: &[
        BadgeLevel::new(1, 1.0),
        BadgeLevel::new(2, 2.0),
        BadgeLevel::new(3, 3.0),
        BadgeLevel::new(4, 5.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for WikiHit {
    fn definition(&self) -> &'static BadgeDefinition {
        &WIKI_HIT
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mentions = input.person.post_count(MentionSource::Wikipedia) as f64;
        if mentions <= threshold {
            return Ok(None);
        }

        let urls: Vec<&str> = input.person.wikipedia_urls().into_iter().collect();
        let candidate = Candidate::new(mentions)
            .with_products(
                input
                    .products()
                    .iter()
                    .filter(|product| product.has_source(MentionSource::Wikipedia)),
            )
            .with_support(format!("Wikipedia titles include: {}.", urls.join(", ")));
        Ok(Some(candidate))
    }
}

/// Long-form coverage relative to short-form chatter on recent products.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepInterest;

static DEEP_INTEREST: BadgeDefinition = BadgeDefinition {
    name: "deep_interest",
    display_name: "Deep interest",
    category: BadgeCategory::Channels,
    description: "People are deeply interested in your research.  Your ratio of (news + blogs) / (twitter + facebook) is {value}",
    extra_description: Some("Based on papers published since 2012 that have more than 10 relevant posts."),
    importance: 0.4,
    is_for_products: true,
    levels: &[BadgeLevel::new(1, 0.001)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for DeepInterest {
    fn definition(&self) -> &'static BadgeDefinition {
        &DEEP_INTEREST
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut best: Option<Candidate> = None;
        for product in input.products() {
            let recent = product
                .year
                .map(|year| year >= DEEP_INTEREST_SINCE_YEAR)
                .unwrap_or(false);
            if !recent {
                continue;
            }

            let longform = (product.post_count(MentionSource::News)
                + product.post_count(MentionSource::Blogs)) as f64;
            let shortform = (product.post_count(MentionSource::Twitter)
                + product.post_count(MentionSource::Facebook)) as f64;
            if shortform <= 0.0 || longform + shortform <= DEEP_INTEREST_MIN_POSTS {
                continue;
            }

            let ratio = longform / shortform;
            // Ties go to the later product.
            let current = best.as_ref().map(|candidate| candidate.value).unwrap_or(0.0);
            if ratio >= current {
                let candidate = best.get_or_insert_with(Candidate::default);
                candidate.value = ratio;
                candidate.reset_products(product);
            }
        }

        Ok(best.filter(|candidate| candidate.value >= threshold))
    }
}
