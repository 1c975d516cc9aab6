use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use threestyle::catalog::{Catalog, PracticeItem};
use threestyle::notation::{self, Commutator};
use threestyle::ranking::{rank, HistoricalResult};
use threestyle::seed;

fn attempt(elapsed_ms: u64, correct: bool) -> HistoricalResult {
    HistoricalResult {
        elapsed_ms,
        correct,
    }
}

#[test]
fn single_pair_catalog_inverts_and_expands() {
    let (catalog, violations) = Catalog::from_items(vec![PracticeItem::new("AB", "[R, U]")]);
    assert!(violations.is_empty());
    assert_eq!(catalog.count(), 1);

    let alg = &catalog.items()[0].algorithm;
    assert_eq!(notation::invert(alg).unwrap(), "[U, R]");
    assert_eq!(notation::expand(alg).unwrap().to_string(), "R U R' U'");
}

#[test]
fn embedded_list_survives_randomizing() {
    let data = seed::default_seed().unwrap();
    assert!(data.rejected_rows.is_empty());
    let (mut catalog, violations) = Catalog::from_items(data.items);
    assert!(violations.is_empty());
    let before = catalog.count();

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        catalog.randomize_with(&mut rng);
        assert_eq!(catalog.count(), before);
        assert!(catalog.items().iter().all(PracticeItem::is_valid));
    }
}

#[test]
fn flipped_item_undoes_original() {
    // Expanding the inverse must be the move-by-move inverse of the original.
    let data = seed::default_seed().unwrap();
    for item in data.items {
        let original = Commutator::parse(&item.algorithm).unwrap();
        let flipped = Commutator::parse(&notation::invert(&item.algorithm).unwrap()).unwrap();
        assert_eq!(
            flipped.expand(),
            original.expand().inverse(),
            "{}",
            item.pair_id
        );
        assert_eq!(flipped.inverse(), original);
    }
}

#[test]
fn practice_order_follows_history() {
    let (catalog, _) = Catalog::from_items(vec![
        PracticeItem::new("UF", "[R, U]"),
        PracticeItem::new("UB", "[U, R]"),
    ]);

    let mut history = HashMap::new();
    history.insert(
        "UF".to_string(),
        vec![
            attempt(1000, true),
            attempt(3000, false),
            attempt(2000, true),
        ],
    );
    history.insert("UB".to_string(), vec![attempt(5000, true); 3]);

    let ranked = rank(&history, &catalog.known_pairs());
    let order: Vec<&str> = ranked.iter().map(|s| s.pair_id.as_str()).collect();
    // BU and FU were never practised and count as three misses each
    assert_eq!(order, ["BU", "FU", "UF", "UB"]);
    assert_eq!(ranked[2].last_three_dnf_count, 1);
    // the wrong attempt still counts towards the mean
    assert_eq!(ranked[2].last_three_mean_ms, Some(2000.0));
}
