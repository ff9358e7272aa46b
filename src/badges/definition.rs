use serde::{Deserialize, Serialize};

/// Display grouping for badges. Catalog ordering sorts on [`BadgeCategory::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Reach,
    Channels,
    Audience,
    Geo,
    Timeline,
    Merit,
    Fun,
}

impl BadgeCategory {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeCategory::Reach => "reach",
            BadgeCategory::Channels => "channels",
            BadgeCategory::Audience => "audience",
            BadgeCategory::Geo => "geo",
            BadgeCategory::Timeline => "timeline",
            BadgeCategory::Merit => "merit",
            BadgeCategory::Fun => "fun",
        }
    }
}

/// One graduated tier of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BadgeLevel {
    pub level: u32,
    pub threshold: f64,
}

impl BadgeLevel {
    pub const fn new(level: u32, threshold: f64) -> Self {
        Self { level, threshold }
    }
}

/// Static metadata describing a badge type.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: BadgeCategory,
    /// May contain a single `{value}` placeholder.
    pub description: &'static str,
    pub extra_description: Option<&'static str>,
    pub importance: f64,
    pub is_for_products: bool,
    /// Empty for pass/fail badges.
    pub levels: &'static [BadgeLevel],
    pub img_url: Option<&'static str>,
    pub video_url: Option<&'static str>,
    pub credit: Option<&'static str>,
    pub is_valid: bool,
}

impl BadgeDefinition {
    /// Baseline used by the catalog entries through struct update syntax.
    pub const BASE: BadgeDefinition = BadgeDefinition {
        name: "",
        display_name: "",
        category: BadgeCategory::Fun,
        description: "",
        extra_description: None,
        importance: 1.0,
        is_for_products: true,
        levels: &[],
        img_url: None,
        video_url: None,
        credit: None,
        is_valid: true,
    };

    pub fn is_leveled(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn max_level(&self) -> u32 {
        self.levels
            .iter()
            .map(|level| level.level)
            .max()
            .unwrap_or(1)
    }

    pub fn threshold_for(&self, level: u32) -> Option<f64> {
        self.levels
            .iter()
            .find(|candidate| candidate.level == level)
            .map(|candidate| candidate.threshold)
    }

    /// Levels in evaluation order: highest threshold first, ties broken by higher level.
    pub fn levels_descending(&self) -> Vec<BadgeLevel> {
        let mut levels = self.levels.to_vec();
        levels.sort_by(|a, b| {
            b.threshold
                .total_cmp(&a.threshold)
                .then_with(|| b.level.cmp(&a.level))
        });
        levels
    }

    pub fn config(&self) -> RuleConfig {
        RuleConfig {
            name: self.name,
            display_name: self.display_name,
            is_for_products: self.is_for_products,
            group: self.category,
            description: self.description,
        }
    }
}

/// Evaluation-free view of a catalog entry for callers that only need the catalog shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    pub is_for_products: bool,
    pub group: BadgeCategory,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LADDER: &[BadgeLevel] = &[
        BadgeLevel::new(1, 3.0),
        BadgeLevel::new(3, 50.0),
        BadgeLevel::new(2, 25.0),
    ];

    #[test]
    fn levels_evaluate_highest_threshold_first() {
        let definition = BadgeDefinition {
            name: "ladder",
            levels: LADDER,
            ..BadgeDefinition::BASE
        };
        let order: Vec<u32> = definition
            .levels_descending()
            .iter()
            .map(|level| level.level)
            .collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(definition.max_level(), 3);
        assert_eq!(definition.threshold_for(2), Some(25.0));
        assert_eq!(definition.threshold_for(9), None);
    }

    #[test]
    fn pass_fail_badges_report_single_level() {
        let definition = BadgeDefinition {
            name: "single",
            ..BadgeDefinition::BASE
        };
        assert!(!definition.is_leveled());
        assert_eq!(definition.max_level(), 1);
    }
}
