use std::collections::BTreeSet;

use super::{BadgeRule, Candidate, RuleInput, RuleOutcome};
use crate::badges::definition::{BadgeCategory, BadgeDefinition, BadgeLevel};
use crate::badges::domain::MentionSource;

const DAYS_PER_YEAR: f64 = 365.0;
/// Width of one streak bucket.
pub const STREAK_BUCKET_DAYS: i64 = 30;
const SLEEPING_BEAUTY_EARLY_DAYS: i64 = 180;
const SLEEPING_BEAUTY_MAX_EARLY_SHARE: f64 = 0.5;
const CLEAN_SWEEP_SINCE_YEAR: i32 = 2012;

/// Number of consecutive buckets, starting at bucket 0, that hold at least one event.
///
/// Bucket `n` covers offsets `[n * bucket_days, (n + 1) * bucket_days)`; negative offsets
/// are ignored.
pub fn consecutive_active_buckets<I>(offsets: I, bucket_days: i64) -> u32
where
    I: IntoIterator<Item = i64>,
{
    if bucket_days <= 0 {
        return 0;
    }

    let active: BTreeSet<i64> = offsets
        .into_iter()
        .filter(|offset| *offset >= 0)
        .map(|offset| offset / bucket_days)
        .collect();

    let mut streak = 0u32;
    while active.contains(&i64::from(streak)) {
        streak += 1;
    }
    streak
}

/// News or blog coverage long after publication.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongLegs;

static LONG_LEGS: BadgeDefinition = BadgeDefinition {
    name: "long_legs",
    display_name: "Long Legs",
    category: BadgeCategory::Timeline,
    description: "Your research received news or blog mentions more than {value} months after it was published",
    importance: 0.5,
    is_for_products: true,
    levels: &[BadgeLevel::new(1, 0.5)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for LongLegs {
    fn definition(&self) -> &'static BadgeDefinition {
        &LONG_LEGS
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let cutoff = threshold * DAYS_PER_YEAR;
        let longform = [MentionSource::News.key(), MentionSource::Blogs.key()];
        let mut best: Option<Candidate> = None;

        for product in input.products() {
            let late_events = product
                .event_days_since_publication
                .iter()
                .filter(|(source, _)| longform.contains(&source.as_str()))
                .flat_map(|(_, days)| days.iter())
                .filter(|day| **day as f64 > cutoff)
                .count() as f64;

            let current = best.as_ref().map(|candidate| candidate.value).unwrap_or(0.0);
            if late_events > current {
                let candidate = best.get_or_insert_with(Candidate::default);
                candidate.value = late_events;
                candidate.reset_products(product);
            }
        }

        Ok(best)
    }
}

/// Activity in every recent month.
#[derive(Debug, Clone, Copy, Default)]
pub struct HotStreak;

static HOT_STREAK: BadgeDefinition = BadgeDefinition {
    name: "hot_streak",
    display_name: "Hot streak",
    category: BadgeCategory::Timeline,
    description: "You made an impact in each of the last {value} months",
    importance: 0.7,
    is_for_products: false,
    levels: &[BadgeLevel::new(1, 1.0)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for HotStreak {
    fn definition(&self) -> &'static BadgeDefinition {
        &HOT_STREAK
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let streak = consecutive_active_buckets(input.person.all_event_days_ago(), STREAK_BUCKET_DAYS);
        if streak == 0 || f64::from(streak) < threshold {
            return Ok(None);
        }
        Ok(Some(Candidate::new(f64::from(streak))))
    }
}

/// Every recent publication has earned attention.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanSweep;

static CLEAN_SWEEP: BadgeDefinition = BadgeDefinition {
    name: "clean_sweep",
    display_name: "Clean sweep",
    category: BadgeCategory::Timeline,
    description: "All of your publications since 2012 have made impact, with at least {value} altmetric score.",
    importance: 0.2,
    is_for_products: false,
    levels: &[BadgeLevel::new(1, 1.0)],
    ..BadgeDefinition::BASE
};

impl BadgeRule for CleanSweep {
    fn definition(&self) -> &'static BadgeDefinition {
        &CLEAN_SWEEP
    }

    fn decide_at_threshold(&self, input: &RuleInput<'_>, threshold: f64) -> RuleOutcome {
        let mut candidate = Candidate::default();
        let mut applicable = 0usize;
        let mut with_impact = 0usize;

        for product in input.products() {
            let recent = product
                .year
                .map(|year| year >= CLEAN_SWEEP_SINCE_YEAR)
                .unwrap_or(false);
            if !recent {
                continue;
            }
            applicable += 1;
            if product.altmetric_score() >= threshold {
                with_impact += 1;
                candidate.add_product(product);
            }
        }

        if applicable == 0 || with_impact < applicable {
            return Ok(None);
        }
        candidate.value = with_impact as f64;
        Ok(Some(candidate))
    }
}

/// Attention that picked up after the first six months.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepingBeauty;

static SLEEPING_BEAUTY: BadgeDefinition = BadgeDefinition {
    name: "sleeping_beauty",
    display_name: "Sleeping beauty",
    category: BadgeCategory::Timeline,
    description: "Your research picked up in activity after its first six months, with a ratio of {value}",
    importance: 0.6,
    is_for_products: true,
    ..BadgeDefinition::BASE
};

impl BadgeRule for SleepingBeauty {
    fn definition(&self) -> &'static BadgeDefinition {
        &SLEEPING_BEAUTY
    }

    fn decide(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let mut found: Option<Candidate> = None;

        for product in input.products() {
            let dated = product.dated_event_count();
            if dated == 0 {
                continue;
            }
            let early = product
                .event_days_since_publication
                .values()
                .flat_map(|days| days.iter())
                .filter(|day| **day <= SLEEPING_BEAUTY_EARLY_DAYS)
                .count();

            let ratio = early as f64 / dated as f64;
            if ratio > SLEEPING_BEAUTY_MAX_EARLY_SHARE {
                continue;
            }

            let candidate = found.get_or_insert_with(|| Candidate::new(ratio));
            candidate.value = candidate.value.min(ratio);
            candidate.add_product(product);
        }

        Ok(found)
    }
}
