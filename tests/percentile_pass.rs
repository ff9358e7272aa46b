use std::sync::Arc;

use impact_badges::badges::{
    percentile, AssignmentEngine, BadgeService, BadgeStore, InMemoryBadgeStore, Person,
    PersonId, Product, ReferenceData, ReferencePopulations, RuleCatalog,
};

fn person_with_score(id: &str, score: f64) -> Person {
    let mut product = Product::new(format!("10.5555/{id}"));
    product.altmetric_score = Some(score);
    Person::new(id, vec![product])
}

fn service() -> (BadgeService<InMemoryBadgeStore>, Arc<InMemoryBadgeStore>) {
    let engine = AssignmentEngine::new(RuleCatalog::standard(), Arc::new(ReferenceData::default()));
    let store = Arc::new(InMemoryBadgeStore::new());
    (BadgeService::new(Arc::new(engine), store.clone()), store)
}

#[test]
fn percentiles_are_monotonic_in_value() {
    let (service, store) = service();
    let people: Vec<Person> = [5.0, 80.0, 12.0, 300.0, 40.0]
        .iter()
        .enumerate()
        .map(|(index, score)| person_with_score(&format!("0000-000{index}"), *score))
        .collect();
    service.refresh_population(&people).expect("population refresh");

    let mut ranked: Vec<(f64, f64)> = store
        .all()
        .expect("all badges")
        .into_iter()
        .filter(|badge| badge.name == "big_hit")
        .map(|badge| (badge.value, badge.percentile.expect("percentile set")))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    assert_eq!(ranked.len(), 5);
    assert!(ranked.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    assert_eq!(ranked[0].1, 0.0);
    assert_eq!(ranked[4].1, 0.8);
}

#[test]
fn percentiles_follow_population_changes() {
    let (service, store) = service();
    service
        .refresh_population(&[person_with_score("0000-0001", 10.0)])
        .expect("first pass");
    service
        .refresh_person(&person_with_score("0000-0002", 20.0))
        .expect("late arrival");

    let late = store
        .badges_for_person(&PersonId("0000-0002".to_string()))
        .expect("fetch");
    assert!(late.iter().all(|badge| badge.percentile.is_none()));

    service.refresh_percentiles().expect("percentile pass");
    let late = store
        .badges_for_person(&PersonId("0000-0002".to_string()))
        .expect("fetch");
    let big_hit = late
        .iter()
        .find(|badge| badge.name == "big_hit")
        .expect("big hit");
    assert_eq!(big_hit.percentile, Some(0.5));
}

#[test]
fn reference_populations_are_grouped_by_badge() {
    let (service, store) = service();
    let people = [
        person_with_score("0000-0001", 4.0),
        person_with_score("0000-0002", 60.0),
    ];
    service.refresh_population(&people).expect("population refresh");

    let records = store.all().expect("all badges");
    let populations = ReferencePopulations::from_records(records.iter());
    assert_eq!(populations.population("big_hit"), &[4.0, 60.0]);
    assert_eq!(populations.population("first_steps"), &[1.0, 1.0]);
    assert!(populations.population("megafan").is_empty());
    assert_eq!(percentile(Some(60.0), populations.population("big_hit")), Some(0.5));
}
