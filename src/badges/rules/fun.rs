use std::collections::{BTreeMap, BTreeSet};

use super::merit::reviewed_as;
use super::{twitter_links, BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};

const URL_SOUP_MIN_URLS: usize = 20;
const BFF_MIN_PRODUCTS: usize = 3;
const RICHARD: &str = "richard";
const RICHARD_NAME_PARTS: &[&str] = &["rick", "rich", "ricky", "dick", "richard"];
const JAPAN: &str = "Japan";

/// A product discussed under many distinct URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSoup;

static URL_SOUP: BadgeDefinition = BadgeDefinition {
    name: "url_soup",
    display_name: "URL soup",
    category: BadgeCategory::Fun,
    description: "You have a research product that has made impact under more than 20 urls",
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for UrlSoup {
    fn definition(&self) -> &'static BadgeDefinition {
        &URL_SOUP
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let mut best: Option<Candidate> = None;
        for product in input.products() {
            let urls = product.impact_urls.len();
            let current = best.as_ref().map(|candidate| candidate.value).unwrap_or(0.0);
            if urls > URL_SOUP_MIN_URLS && urls as f64 > current {
                let candidate = best.get_or_insert_with(Candidate::default);
                candidate.value = urls as f64;
                candidate.reset_products(product);
                let listed: Vec<&str> = product.impact_urls.iter().map(String::as_str).collect();
                candidate.support = Some(format!(
                    "URLs for one of the products include: {}",
                    listed.join(", ")
                ));
            }
        }
        Ok(best)
    }
}

/// Someone shared several of the person's products.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bff;

static BFF: BadgeDefinition = BadgeDefinition {
    name: "bff",
    display_name: "bff",
    category: BadgeCategory::Fun,
    description: "You have a BFF! Someone has tweeted three or more of your papers.",
    is_for_products: false,
    ..BadgeDefinition::BASE
};

impl BadgeRule for Bff {
    fn definition(&self) -> &'static BadgeDefinition {
        &BFF
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let mut shared: BTreeMap<&str, usize> = BTreeMap::new();
        for product in input.products() {
            for handle in product.twitter_posters.keys() {
                *shared.entry(handle.as_str()).or_default() += 1;
            }
        }

        let fans: BTreeSet<&str> = shared
            .into_iter()
            .filter(|(_, products)| *products >= BFF_MIN_PRODUCTS)
            .map(|(handle, _)| handle)
            .collect();
        if fans.is_empty() {
            return Ok(None);
        }

        let candidate = Candidate::new(fans.len() as f64)
            .with_support(format!("BFFs include: {}", twitter_links(fans)));
        Ok(Some(candidate))
    }
}

/// Matches "Richard" and its common short forms, ignoring the final (family) name part
/// unless the whole name ends in "richard".
pub fn is_richard(full_name: &str) -> bool {
    let lowered = full_name.trim().to_lowercase();
    if lowered.ends_with(RICHARD) {
        return true;
    }

    let parts: Vec<&str> = lowered.split_whitespace().collect();
    let given = parts.len().saturating_sub(1);
    parts[..given]
        .iter()
        .any(|part| RICHARD_NAME_PARTS.contains(part))
}

/// Shared by someone named Richard.
#[derive(Debug, Clone, Copy, Default)]
pub struct RickRoll;

static RICK_ROLL: BadgeDefinition = BadgeDefinition {
    name: "rick_roll",
    display_name: "Rickroll",
    category: BadgeCategory::Fun,
    description: "You have been tweeted by a person named Richard!",
    is_for_products: true,
    video_url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
    ..BadgeDefinition::BASE
};

impl BadgeRule for RickRoll {
    fn definition(&self) -> &'static BadgeDefinition {
        &RICK_ROLL
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let mut found: Option<Candidate> = None;
        for product in input.products() {
            for name in &product.twitter_poster_names {
                if !is_richard(name) {
                    continue;
                }
                let candidate = found.get_or_insert_with(|| Candidate::new(1.0));
                candidate.add_product(product);
                candidate.support = Some(format!("Thanks, {name}"));
            }
        }
        Ok(found)
    }
}

/// Mentioned from Japan.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigInJapan;

static BIG_IN_JAPAN: BadgeDefinition = BadgeDefinition {
    name: "big_in_japan",
    display_name: "Big in Japan",
    category: BadgeCategory::Fun,
    description: "You made impact in Japan!",
    is_for_products: true,
    video_url: Some("https://www.youtube.com/watch?v=tl6u2NASUzU"),
    credit: Some("Alphaville - \"Big In Japan\""),
    ..BadgeDefinition::BASE
};

impl BadgeRule for BigInJapan {
    fn definition(&self) -> &'static BadgeDefinition {
        &BIG_IN_JAPAN
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let products: Vec<_> = input
            .products()
            .iter()
            .filter(|product| input.has_country(product, JAPAN))
            .collect();
        if products.is_empty() {
            return Ok(None);
        }
        Ok(Some(Candidate::new(1.0).with_products(products)))
    }
}

/// F1000 reviewers tagged the work as controversial.
#[derive(Debug, Clone, Copy, Default)]
pub struct Controversial;

static CONTROVERSIAL: BadgeDefinition = BadgeDefinition {
    name: "controversial",
    display_name: "Controversial",
    category: BadgeCategory::Fun,
    description: "Cool! An F1000 reviewer called your research Controversial!",
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for Controversial {
    fn definition(&self) -> &'static BadgeDefinition {
        &CONTROVERSIAL
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        Ok(reviewed_as(input, "controversial"))
    }
}

/// Shared by accounts on the curated notable-scientist list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamousFollower;

static FAMOUS_FOLLOWER: BadgeDefinition = BadgeDefinition {
    name: "famous_follower",
    display_name: "Famous follower",
    category: BadgeCategory::Fun,
    description: "You have been tweeted by {value} well-known scientists",
    is_for_products: true,
    levels: &[
        BadgeLevel::new(1, 1.0),
        BadgeLevel::new(2, 2.0),
        BadgeLevel::new(3, 3.0),
        BadgeLevel::new(4, 5.0),
    ],
    ..BadgeDefinition::BASE
};

impl BadgeRule for FamousFollower {
    fn definition(&self) -> &'static BadgeDefinition {
        &FAMOUS_FOLLOWER
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let notable = &input.reference.notable_accounts;
        let mut candidate = Candidate::default();
        let mut fans: BTreeSet<&str> = BTreeSet::new();

        for product in input.products() {
            for handle in product.twitter_posters.keys() {
                if notable.contains(handle) {
                    fans.insert(handle.as_str());
                    candidate.add_product(product);
                }
            }
        }

        let count = fans.len() as f64;
        if count <= threshold {
            return Ok(None);
        }
        candidate.value = count;
        candidate.support = Some(format!("Famous fans include: {}", twitter_links(fans)));
        Ok(Some(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::domain::{Person, Product};
    use crate::badges::reference::{CountryTable, NotableAccounts, ReferenceData};

    fn tweeted_by(id: &str, handles: &[&str]) -> Product {
        let mut product = Product::new(id);
        product.twitter_posters = handles
            .iter()
            .map(|handle| (handle.to_string(), 10))
            .collect();
        product
    }

    #[test]
    fn richard_heuristic_skips_family_name() {
        assert!(is_richard("Richard Feynman"));
        assert!(is_richard("Rick Astley"));
        assert!(is_richard("Dr. Ricky Gervais"));
        assert!(is_richard("Cliff Richard"));
        assert!(!is_richard("Adrienne Rich"));
        assert!(!is_richard("Rick"));
        assert!(!is_richard(""));
    }

    #[test]
    fn rick_roll_thanks_the_poster() {
        let reference = ReferenceData::default();
        let mut product = Product::new("10.1/a");
        product.twitter_poster_names = vec!["Jane Doe".to_string(), "Rich Roberts".to_string()];
        let person = Person::new("0000-0060", vec![product, Product::new("10.1/b")]);

        let candidate = RickRoll
            .decide(&RuleInput::new(&person, &reference))
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.support.as_deref(), Some("Thanks, Rich Roberts"));
        assert_eq!(candidate.products.len(), 1);
    }

    #[test]
    fn bff_needs_three_shared_products() {
        let reference = ReferenceData::default();
        let person = Person::new(
            "0000-0061",
            vec![
                tweeted_by("10.1/a", &["loyal", "casual"]),
                tweeted_by("10.1/b", &["loyal", "casual"]),
                tweeted_by("10.1/c", &["loyal"]),
            ],
        );

        let candidate = Bff
            .decide(&RuleInput::new(&person, &reference))
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 1.0);
        let support = candidate.support.expect("support text");
        assert!(support.contains("@loyal"));
        assert!(!support.contains("@casual"));
    }

    #[test]
    fn url_soup_requires_more_than_twenty_urls() {
        let reference = ReferenceData::default();
        let mut crowded = Product::new("10.1/crowded");
        crowded.impact_urls = (0..21)
            .map(|index| format!("https://example.org/{index:02}"))
            .collect();
        let mut sparse = Product::new("10.1/sparse");
        sparse.impact_urls = (0..20)
            .map(|index| format!("https://example.net/{index:02}"))
            .collect();

        let person = Person::new("0000-0062", vec![sparse.clone()]);
        assert_eq!(UrlSoup.decide(&RuleInput::new(&person, &reference)), Ok(None));

        let person = Person::new("0000-0063", vec![sparse, crowded]);
        let candidate = UrlSoup
            .decide(&RuleInput::new(&person, &reference))
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 21.0);
        assert_eq!(candidate.products.len(), 1);
    }

    #[test]
    fn famous_follower_matches_case_insensitively() {
        let reference = ReferenceData::new(
            CountryTable::default(),
            NotableAccounts::new(["neiltyson", "EdYong209", "bengoldacre"]),
        );
        let person = Person::new(
            "0000-0064",
            vec![
                tweeted_by("10.1/a", &["NeilTyson", "nobody"]),
                tweeted_by("10.1/b", &["edyong209"]),
            ],
        );
        let input = RuleInput::new(&person, &reference);

        let candidate = FamousFollower
            .decide_at_threshold(&input, 1.0)
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 2.0);
        assert_eq!(candidate.products.len(), 2);
        assert_eq!(FamousFollower.decide_at_threshold(&input, 2.0), Ok(None));
    }

    #[test]
    fn big_in_japan_uses_canonical_country_names() {
        let countries = CountryTable::from_readers(
            "iso,name\nJP,Japan\n".as_bytes(),
            "name,is_global_south,pacific_rim\nJapan,false,west\n".as_bytes(),
        )
        .expect("tables parse");
        let reference = ReferenceData::new(countries, NotableAccounts::default());
        let mut product = Product::new("10.1/a");
        product.post_counts_by_country.insert("jp".to_string(), 1);
        let person = Person::new("0000-0065", vec![product]);

        let candidate = BigInJapan
            .decide(&RuleInput::new(&person, &reference))
            .expect("no reference lookups")
            .expect("assigned");
        assert_eq!(candidate.value, 1.0);
    }
}
