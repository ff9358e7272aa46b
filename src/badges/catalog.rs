use std::collections::BTreeMap;

use super::definition::RuleConfig;
use super::rules::{
    Babel, BadgeRule, BigHit, BigInJapan, Bff, CleanSweep, Controversial, DeepInterest, Depsy,
    FamousFollower, FirstSteps, GlobalReach, GlobalSouth, GoodForTeaching, HotStreak,
    Impressions, InvalidRule, IvoryTower, LongLegs, Megafan, PacificRim, PracticalMagic,
    PressPass, Publons, RickRoll, SleepingBeauty, SpecialInterests, UrlSoup, WikiHit,
};

static INVALID: InvalidRule = InvalidRule;

/// Ordered registry of every badge rule.
pub struct RuleCatalog {
    rules: Vec<Box<dyn BadgeRule>>,
}

impl RuleCatalog {
    /// The full catalog, stable-sorted by category label.
    pub fn standard() -> Self {
        let rules: Vec<Box<dyn BadgeRule>> = vec![
            Box::new(Depsy),
            Box::new(BigHit),
            Box::new(WikiHit),
            Box::new(Impressions),
            Box::new(Babel),
            Box::new(GlobalReach),
            Box::new(LongLegs),
            Box::new(Megafan),
            Box::new(HotStreak),
            Box::new(DeepInterest),
            Box::new(CleanSweep),
            Box::new(GlobalSouth),
            Box::new(PacificRim),
            Box::new(IvoryTower),
            Box::new(PracticalMagic),
            Box::new(PressPass),
            Box::new(SpecialInterests),
            Box::new(SleepingBeauty),
            Box::new(GoodForTeaching),
            Box::new(Publons),
            Box::new(FirstSteps),
            Box::new(UrlSoup),
            Box::new(Bff),
            Box::new(RickRoll),
            Box::new(BigInJapan),
            Box::new(Controversial),
            Box::new(FamousFollower),
        ];
        Self::from_rules(rules)
    }

    /// Build a catalog from an explicit rule list, applying the category ordering.
    pub fn from_rules(mut rules: Vec<Box<dyn BadgeRule>>) -> Self {
        rules.sort_by_key(|rule| rule.definition().category.label());
        Self { rules }
    }

    pub fn all_rules(&self) -> impl Iterator<Item = &dyn BadgeRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn BadgeRule> {
        self.all_rules().find(|rule| rule.name() == name)
    }

    /// Matching rule, or the invalid sentinel; check [`BadgeRule::is_valid`].
    pub fn rule_by_name(&self, name: &str) -> &dyn BadgeRule {
        self.get(name).unwrap_or(&INVALID)
    }

    /// Static metadata for every rule keyed by name.
    pub fn config_snapshot(&self) -> BTreeMap<&'static str, RuleConfig> {
        self.all_rules()
            .map(|rule| (rule.name(), rule.definition().config()))
            .collect()
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
