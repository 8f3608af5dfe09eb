//! Integration tests for candidate selection across age parsing, skip
//! lists and catalog ordering.

use chrono::NaiveDate;
use esguard_core::catalog::{CatalogError, IndexCatalog, SkipSet, UndatedPolicy};
use esguard_core::index_age::{date_suffix, index_age, INDEX_DATE_LAYOUT};

fn catalog(names: &[&str], skip: &[&str]) -> Result<IndexCatalog, CatalogError> {
    let skip: SkipSet = skip.iter().copied().collect();
    IndexCatalog::from_names(names.iter().map(|s| s.to_string()), &skip)
}

// ---------------------------------------------------------------------------
// Test: daily indices retire oldest first
// ---------------------------------------------------------------------------

#[test]
fn three_daily_indices_retire_oldest_first() {
    let catalog = catalog(&["app-2023.06.15", "app-2024.02.10", "app-2023.01.01"], &[]).unwrap();

    assert_eq!(
        catalog.names(),
        ["app-2023.01.01", "app-2023.06.15", "app-2024.02.10"]
    );
    assert_eq!(catalog.candidate(UndatedPolicy::Protect).unwrap(), "app-2023.01.01");
}

#[test]
fn skipped_oldest_falls_through_to_next() {
    let catalog = catalog(&["app-2023.01.01", "app-2023.06.15"], &["app-2023.01.01"]).unwrap();

    assert_eq!(catalog.candidate(UndatedPolicy::Protect).unwrap(), "app-2023.06.15");
    assert!(!catalog.names().iter().any(|n| n == "app-2023.01.01"));
}

// ---------------------------------------------------------------------------
// Test: mixed prefixes and undated names
// ---------------------------------------------------------------------------

/// Dates decide the order across unrelated index families.
#[test]
fn order_ignores_prefixes() {
    let names = [
        "nginx-2023.03.01",
        "audit-2023.03.02",
        "zeek-2022.11.30",
        "apm-7.17-2023.01.15",
    ];
    let catalog = catalog(&names, &[]).unwrap();

    let ages: Vec<NaiveDate> = catalog
        .names()
        .iter()
        .map(|n| index_age(n).unwrap())
        .collect();
    let mut sorted = ages.clone();
    sorted.sort();

    assert_eq!(ages, sorted);
    assert_eq!(catalog.candidate(UndatedPolicy::Protect).unwrap(), "zeek-2022.11.30");
}

#[test]
fn undated_name_is_never_sole_candidate_next_to_dated_one() {
    for policy in [UndatedPolicy::Protect, UndatedPolicy::Allow] {
        let catalog = catalog(&["logs", "metrics-v2", ".kibana", "app-2099.12.31"], &[]).unwrap();
        assert_eq!(catalog.candidate(policy).unwrap(), "app-2099.12.31");
    }
}

#[test]
fn skip_list_wins_over_age() {
    let catalog = catalog(
        &["old-2001.01.01", "new-2024.01.01", "logs"],
        &["old-2001.01.01", "logs"],
    )
    .unwrap();

    assert_eq!(catalog.names(), ["new-2024.01.01"]);
}

#[test]
fn all_skipped_yields_no_eligible_indices() {
    let err = catalog(&["a-2023.01.01"], &["a-2023.01.01"]).unwrap_err();
    assert!(matches!(err, CatalogError::NoEligibleIndices { .. }));
}

// ---------------------------------------------------------------------------
// Test: extracted ages format back to their suffix
// ---------------------------------------------------------------------------

#[test]
fn ages_round_trip_through_layout() {
    let names = [
        "app-2023.01.01",
        "filebeat-8.12.0-2024.03.31",
        "x-2000.02.29",
        "metrics-v2-1970.01.01",
    ];

    for name in names {
        let age = index_age(name).unwrap_or_else(|| panic!("{name} should have an age"));
        assert_eq!(
            age.format(INDEX_DATE_LAYOUT).to_string(),
            date_suffix(name).unwrap(),
            "round trip failed for {name}"
        );
    }
}
