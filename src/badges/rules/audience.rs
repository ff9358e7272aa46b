use std::collections::{BTreeMap, BTreeSet};

use super::{audience_proportion, twitter_links, BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};
use crate::badges::domain::AudienceType;

const ENGLISH: &str = "en";
/// An audience segment must exceed this share before it earns a badge.
const AUDIENCE_SHARE_FLOOR: f64 = 0.01;

/// Attention in languages other than English.
#[derive(Debug, Clone, Copy, Default)]
pub struct Babel;

static BABEL: BadgeDefinition = BadgeDefinition {
    name: "babel",
    display_name: "Babel",
    category: BadgeCategory::Audience,
    description: "Your impact is in {value} more languages than just English!",
    extra_description: Some("Due to issues with the Twitter API, we don't have language information for tweets yet."),
    importance: 0.85,
    is_for_products: false,
    levels: &[
        BadgeLevel::new(1, 1.0),
        BadgeLevel::new(2, 2.0),
        BadgeLevel::new(3, 3.0),
        BadgeLevel::new(4, 4.0),
        BadgeLevel::new(5, 5.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for Babel {
    fn definition(&self) -> &'static BadgeDefinition {
        &BABEL
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut languages: BTreeMap<&str, &str> = BTreeMap::new();
        let mut candidate = Candidate::default();

        for product in input.products() {
            let mut touches_other_language = false;
            for (language, url) in &product.languages_with_examples {
                if language.eq_ignore_ascii_case(ENGLISH) {
                    continue;
                }
                touches_other_language = true;
                languages.insert(language.as_str(), url.as_str());
            }
            if touches_other_language {
                candidate.add_product(product);
            }
        }

        let count = languages.len() as f64;
        if count == 0.0 || count < threshold {
            return Ok(None);
        }

        let links: Vec<String> = languages
            .iter()
            .map(|(language, url)| format!("<a href='{url}'>{language}</a>"))
            .collect();
        candidate.value = count;
        candidate.support = Some(format!("Languages: {}", links.join(", ")));
        Ok(Some(candidate))
    }
}

/// Shared by an account with a large following.
#[derive(Debug, Clone, Copy, Default)]
pub struct Megafan;

static MEGAFAN: BadgeDefinition = BadgeDefinition {
    name: "megafan",
    display_name: "Megafan",
    category: BadgeCategory::Audience,
    description: "Someone with more than {value} followers has tweeted your research.",
    importance: 0.4,
    is_for_products: true,
    levels: &[
        BadgeLevel::new(1, 100.0),
        BadgeLevel::new(2, 5_000.0),
        BadgeLevel::new(3, 10_000.0),
        BadgeLevel::new(4, 25_000.0),
        BadgeLevel::new(5, 50_000.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for Megafan {
    fn definition(&self) -> &'static BadgeDefinition {
        &MEGAFAN
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut best: Option<Candidate> = None;
        let mut fans: BTreeSet<&str> = BTreeSet::new();

        for product in input.products() {
            for (handle, followers) in &product.twitter_posters {
                let followers = *followers as f64;
                if followers > threshold {
                    fans.insert(handle.as_str());
                }
                let current = best.as_ref().map(|candidate| candidate.value).unwrap_or(0.0);
                if followers > current {
                    let candidate = best.get_or_insert_with(Candidate::default);
                    candidate.value = followers;
                    candidate.reset_products(product);
                }
            }
        }

        Ok(best
            .filter(|candidate| candidate.value > threshold)
            .map(|candidate| {
                candidate.with_support(format!("Megafans include: {}", twitter_links(fans)))
            }))
    }
}

fn audience_badge(input: &RuleInput<'_>, audiences: &[AudienceType]) -> RuleOutcome {
    let proportion = audience_proportion(input.person, audiences);
    if proportion > AUDIENCE_SHARE_FLOOR {
        return Ok(Some(Candidate::new(proportion * 100.0)));
    }
    Ok(None)
}

/// Attention coming from other researchers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IvoryTower;

static IVORY_TOWER: BadgeDefinition = BadgeDefinition {
    name: "ivory_tower",
    display_name: "Ivory Tower",
    category: BadgeCategory::Audience,
    description: "More than {value}% of your impact is from other researchers.",
    importance: 0.1,
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for IvoryTower {
    fn definition(&self) -> &'static BadgeDefinition {
        &IVORY_TOWER
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        audience_badge(input, &[AudienceType::Scientists])
    }
}

/// Attention coming from practitioners.
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticalMagic;

static PRACTICAL_MAGIC: BadgeDefinition = BadgeDefinition {
    name: "practical_magic",
    display_name: "Practical Magic",
    category: BadgeCategory::Audience,
    description: "More than {value}% of your impact is from practitioners.",
    importance: 0.6,
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for PracticalMagic {
    fn definition(&self) -> &'static BadgeDefinition {
        &PRACTICAL_MAGIC
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        audience_badge(input, &[AudienceType::Practitioners])
    }
}

/// Attention coming from science communicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressPass;

static PRESS_PASS: BadgeDefinition = BadgeDefinition {
    name: "press_pass",
    display_name: "Press pass",
    category: BadgeCategory::Audience,
    description: "More than {value}% of your impact is from science communicators.",
    importance: 0.25,
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for PressPass {
    fn definition(&self) -> &'static BadgeDefinition {
        &PRESS_PASS
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        audience_badge(input, &[AudienceType::ScienceCommunicators])
    }
}

/// Combined share of every specialist audience.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialInterests;

static SPECIAL_INTERESTS: BadgeDefinition = BadgeDefinition {
    name: "special_interests",
    display_name: "Special interests",
    category: BadgeCategory::Audience,
    description: "{value}% of your audience is a special demo",
    importance: 0.25,
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for SpecialInterests {
    fn definition(&self) -> &'static BadgeDefinition {
        &SPECIAL_INTERESTS
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        audience_badge(
            input,
            &[
                AudienceType::ScienceCommunicators,
                AudienceType::Scientists,
                AudienceType::Practitioners,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::domain::{Person, Product};
    use crate::badges::reference::ReferenceData;

    fn with_posters(id: &str, posters: &[(&str, u64)]) -> Product {
        let mut product = Product::new(id);
        product.twitter_posters = posters
            .iter()
            .map(|(handle, followers)| (handle.to_string(), *followers))
            .collect();
        product
    }

    #[test]
    fn babel_counts_languages_beyond_english() {
        let mut first = Product::new("10.1/a");
        first
            .languages_with_examples
            .insert("en".to_string(), "https://example.org/en".to_string());
        first
            .languages_with_examples
            .insert("de".to_string(), "https://example.org/de".to_string());
        let mut second = Product::new("10.1/b");
        second
            .languages_with_examples
            .insert("ja".to_string(), "https://example.org/ja".to_string());
        let english_only = {
            let mut product = Product::new("10.1/c");
            product
                .languages_with_examples
                .insert("en".to_string(), "https://example.org/c".to_string());
            product
        };

        let person = Person::new("0000-0020", vec![first, second, english_only]);
        let reference = ReferenceData::default();
        let input = RuleInput::new(&person, &reference);

        let candidate = Babel
            .decide_at_threshold(&input, 2.0)
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 2.0);
        assert_eq!(candidate.products.len(), 2);
        assert_eq!(Babel.decide_at_threshold(&input, 3.0), Ok(None));
    }

    #[test]
    fn megafan_keeps_product_of_largest_follower_count() {
        let person = Person::new(
            "0000-0021",
            vec![
                with_posters("10.1/a", &[("smallfry", 150)]),
                with_posters("10.1/b", &[("bigdeal", 12_000), ("tiny", 3)]),
            ],
        );
        let reference = ReferenceData::default();
        let input = RuleInput::new(&person, &reference);

        let candidate = Megafan
            .decide_at_threshold(&input, 10_000.0)
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 12_000.0);
        assert_eq!(candidate.products.len(), 1);
        let support = candidate.support.expect("support text");
        assert!(support.contains("@bigdeal"));
        assert!(!support.contains("@smallfry"));

        assert_eq!(Megafan.decide_at_threshold(&input, 25_000.0), Ok(None));
    }

    #[test]
    fn audience_badges_need_classified_posters() {
        let person = Person::new("0000-0022", vec![Product::new("10.1/a")]);
        let reference = ReferenceData::default();
        let input = RuleInput::new(&person, &reference);

        assert_eq!(IvoryTower.decide(&input), Ok(None));
        assert_eq!(SpecialInterests.decide(&input), Ok(None));
    }

    #[test]
    fn press_pass_reports_percentage() {
        let mut product = Product::new("10.1/a");
        product.poster_counts_by_type.insert(
            AudienceType::ScienceCommunicators.label().to_string(),
            1,
        );
        product
            .poster_counts_by_type
            .insert(AudienceType::Public.label().to_string(), 3);
        let person = Person::new("0000-0023", vec![product]);
        let reference = ReferenceData::default();
        let input = RuleInput::new(&person, &reference);

        let candidate = PressPass
            .decide(&input)
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 25.0);
        assert_eq!(PracticalMagic.decide(&input), Ok(None));
    }
}
