use super::{BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition};
use crate::badges::domain::MentionSource;

const PUBLONS_MIN_WEIGHTED_AVERAGE: f64 = 5.0;

/// Products whose F1000 reviews carry `class`, with their review URLs.
pub(crate) fn reviewed_as(input: &RuleInput<'_>, class: &str) -> Option<Candidate> {
    let mut candidate = Candidate::default();
    let mut urls: Vec<&str> = Vec::new();

    for product in input.products() {
        let matching = product.review_urls_for_class(class);
        if !matching.is_empty() {
            candidate.add_product(product);
            urls.extend(matching);
        }
    }

    if urls.is_empty() {
        return None;
    }
    candidate.value = 1.0;
    candidate.support = Some(format!("The F1000 reviews include: {}.", urls.join(", ")));
    Some(candidate)
}

/// F1000 reviewers tagged the work as good for teaching.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodForTeaching;

static GOOD_FOR_TEACHING: BadgeDefinition = BadgeDefinition {
    name: "good_for_teaching",
    display_name: "Good for teaching",
    category: BadgeCategory::Merit,
    description: "Cool! An F1000 reviewer called your research good for teaching",
    importance: 0.4,
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for GoodForTeaching {
    fn definition(&self) -> &'static BadgeDefinition {
        &GOOD_FOR_TEACHING
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        Ok(reviewed_as(input, "good_for_teaching"))
    }
}

/// Strong Publons peer-review scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Publons;

static PUBLONS: BadgeDefinition = BadgeDefinition {
    name: "publons",
    display_name: "Publons star",
    category: BadgeCategory::Merit,
    description: "Your research has a great score on Publons!",
    importance: 0.7,
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for Publons {
    fn definition(&self) -> &'static BadgeDefinition {
        &PUBLONS
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        if input.person.post_count(MentionSource::PeerReviews) == 0 {
            return Ok(None);
        }

        let mut candidate = Candidate::default();
        let mut links: Vec<String> = Vec::new();
        for product in input.products() {
            for review in &product.publons_reviews {
                let strong = review
                    .weighted_average
                    .map(|average| average > PUBLONS_MIN_WEIGHTED_AVERAGE)
                    .unwrap_or(false);
                if strong {
                    candidate.add_product(product);
                    links.push(format!("<a href='{}'>Review</a>", review.url));
                }
            }
        }

        if links.is_empty() {
            return Ok(None);
        }
        candidate.value = 1.0;
        candidate.support = Some(format!("Publons reviews: {}", links.join(", ")));
        Ok(Some(candidate))
    }
}
