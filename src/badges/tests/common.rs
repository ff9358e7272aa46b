use std::sync::Arc;

use crate::badges::domain::{Person, Product};
use crate::badges::engine::AssignmentEngine;
use crate::badges::reference::ReferenceData;
use crate::badges::service::BadgeService;
use crate::badges::store::InMemoryBadgeStore;
use crate::badges::RuleCatalog;

const COUNTRY_CODES: &str = "iso,name\n\
JP,Japan\n\
FR,France\n\
BR,Brazil\n\
XK,Kosovo\n";

const COUNTRY_INFO: &str = "name,is_global_south,pacific_rim\n\
Japan,false,west\n\
France,false,\n\
Brazil,true,\n";

const NOTABLE_ACCOUNTS: &str = "# curated\nneiltyson\n";

/// Reference tables where Kosovo canonicalises but has no classification row.
pub(super) fn reference() -> Arc<ReferenceData> {
    let data = ReferenceData::from_readers(
        COUNTRY_CODES.as_bytes(),
        COUNTRY_INFO.as_bytes(),
        NOTABLE_ACCOUNTS.as_bytes(),
    )
    .expect("inline reference data parses");
    Arc::new(data)
}

pub(super) fn engine() -> AssignmentEngine {
    AssignmentEngine::new(RuleCatalog::standard(), reference())
}

pub(super) fn build_service() -> (BadgeService<InMemoryBadgeStore>, Arc<InMemoryBadgeStore>) {
    let store = Arc::new(InMemoryBadgeStore::new());
    let service = BadgeService::new(Arc::new(engine()), store.clone());
    (service, store)
}

pub(super) fn scored(id: &str, score: f64) -> Product {
    let mut product = Product::new(id);
    product.altmetric_score = Some(score);
    product
}

pub(super) fn mentioned_from(id: &str, countries: &[(&str, u64)]) -> Product {
    let mut product = scored(id, 1.0);
    product.post_counts_by_country = countries
        .iter()
        .map(|(iso, count)| (iso.to_string(), *count))
        .collect();
    product
}

pub(super) fn person(id: &str, products: Vec<Product>) -> Person {
    Person::new(id, products)
}

pub(super) fn badge_names(badges: &[crate::badges::BadgeRecord]) -> Vec<&str> {
    badges.iter().map(|badge| badge.name.as_str()).collect()
}
