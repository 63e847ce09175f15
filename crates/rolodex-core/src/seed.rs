//! Random sample data for a fresh address book.
//!
//! Wipes the store, creates one `Christmas <year>` label per year, then
//! inserts random addresses, each tagged with a random non-empty subset of
//! those labels.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::{AddressFields, Label};
use crate::store::Store;

pub const DEFAULT_COUNT: usize = 100;
pub const DEFAULT_YEARS: std::ops::RangeInclusive<i32> = 2019..=2024;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Elena", "Frank", "Grace", "Hector", "Irene", "James",
    "Karen", "Luis", "Maria", "Nathan", "Olivia", "Peter", "Quinn", "Rosa", "Samuel", "Tara",
    "Umar", "Vera", "Walter", "Ximena", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Brooks", "Castillo", "Dawson", "Ellis", "Fischer", "Garcia", "Hughes", "Ibarra",
    "Jensen", "Kim", "Lopez", "Morgan", "Nguyen", "Owens", "Patel", "Quincy", "Reyes", "Silva",
    "Turner", "Underwood", "Vargas", "Walsh", "Young", "Zimmerman",
];

const STREET_NAMES: &[&str] = &[
    "Main", "Oak", "Pine", "Maple", "Cedar", "Elm", "Washington", "Lake", "Hill", "Park",
    "Sunset", "Ridge", "Willow", "Church", "Mill", "River",
];

const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Rd", "Ln", "Blvd", "Dr", "Ct", "Way"];

const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview",
    "Salem", "Madison", "Georgetown", "Arlington", "Ashland", "Dover", "Oxford", "Jackson",
];

const STATES: &[&str] = &[
    "AL", "AK", "AZ", "CA", "CO", "CT", "FL", "GA", "IL", "IN", "MA", "MI", "MN", "NC", "NJ",
    "NY", "OH", "OR", "PA", "TX", "VA", "WA", "WI",
];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Number of addresses to create.
    pub count: usize,
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Years to create `Christmas <year>` labels for.
    pub years: Vec<i32>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            seed: None,
            years: DEFAULT_YEARS.collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub addresses: usize,
    pub labels: usize,
    pub associations: usize,
}

#[must_use]
pub fn year_label(year: i32) -> String {
    format!("Christmas {year}")
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

fn random_fields<R: Rng + ?Sized>(rng: &mut R) -> AddressFields {
    let name = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
    let street = format!(
        "{} {} {}",
        rng.gen_range(1..=9999),
        pick(rng, STREET_NAMES),
        pick(rng, STREET_SUFFIXES)
    );
    let zipcode = format!("{:05}", rng.gen_range(501..=99_950));
    AddressFields::new(name, street, pick(rng, CITIES), pick(rng, STATES), zipcode)
}

/// Draw between 1 and `labels.len()` picks with replacement and keep the
/// distinct ones, so every address gets at least one label.
fn random_labels<'a, R: Rng + ?Sized>(rng: &mut R, labels: &'a [Label]) -> BTreeSet<&'a Label> {
    if labels.is_empty() {
        return BTreeSet::new();
    }
    let draws = rng.gen_range(1..=labels.len());
    (0..draws).filter_map(|_| labels.choose(rng)).collect()
}

/// Clear the store and fill it with random addresses and year labels.
///
/// # Errors
///
/// Returns the first store error; rows written before it are kept.
pub fn reset_and_seed<S: Store + ?Sized>(store: &S, options: &SeedOptions) -> Result<SeedReport> {
    let mut rng = options
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    store.reset()?;

    let labels = options
        .years
        .iter()
        .map(|year| store.create_label(&year_label(*year)))
        .collect::<Result<Vec<_>>>()?;

    let mut report = SeedReport {
        labels: labels.len(),
        ..SeedReport::default()
    };

    for _ in 0..options.count {
        let address = store.create_address(&random_fields(&mut rng))?;
        report.addresses += 1;
        for label in random_labels(&mut rng, &labels) {
            if store.insert_association(label, address.id)? {
                report.associations += 1;
            }
        }
    }

    info!(
        addresses = report.addresses,
        labels = report.labels,
        associations = report.associations,
        "seeded address book"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AddressId;
    use crate::store::SqliteStore;

    fn options(count: usize, seed: u64) -> SeedOptions {
        SeedOptions {
            count,
            seed: Some(seed),
            ..SeedOptions::default()
        }
    }

    #[test]
    fn default_options_match_sample_database() {
        let opts = SeedOptions::default();
        assert_eq!(opts.count, 100);
        assert_eq!(opts.years, vec![2019, 2020, 2021, 2022, 2023, 2024]);
        assert_eq!(year_label(2024), "Christmas 2024");
    }

    #[test]
    fn every_address_is_complete_and_labeled() {
        let store = SqliteStore::in_memory().expect("store");
        let report = reset_and_seed(&store, &options(25, 7)).expect("seed");

        assert_eq!(report.addresses, 25);
        assert_eq!(report.labels, 6);
        let addresses = store.list_addresses().expect("list");
        assert_eq!(addresses.len(), 25);
        for address in &addresses {
            assert!(address.is_complete(), "{address:?}");
            let labels = store.labels_for(address.id).expect("labels");
            assert!(!labels.is_empty());
            assert!(labels.len() <= 6);
        }
        let total: usize = store
            .list_labels_with_counts()
            .expect("labels")
            .iter()
            .map(|row| row.count)
            .sum();
        assert_eq!(total, report.associations);
    }

    #[test]
    fn reseeding_replaces_previous_rows() {
        let store = SqliteStore::in_memory().expect("store");
        reset_and_seed(&store, &options(5, 1)).expect("seed");
        reset_and_seed(&store, &options(3, 2)).expect("reseed");

        assert_eq!(store.count_addresses().expect("count"), 3);
        assert!(store.get_address(AddressId::new(4)).is_err());
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let a = SqliteStore::in_memory().expect("store");
        let b = SqliteStore::in_memory().expect("store");
        reset_and_seed(&a, &options(10, 99)).expect("seed");
        reset_and_seed(&b, &options(10, 99)).expect("seed");

        let names = |store: &SqliteStore| -> Vec<String> {
            store
                .list_addresses()
                .expect("list")
                .into_iter()
                .map(|addr| addr.name)
                .collect()
        };
        assert_eq!(names(&a), names(&b));
    }
}
