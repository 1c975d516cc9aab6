use std::fmt;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notation::{self, ParseError};

/// A pair being drilled together with the commutator that solves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    pub pair_id: String,
    pub algorithm: String,
    #[serde(default)]
    pub skipped: bool,
}

impl PracticeItem {
    pub fn new(pair_id: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            pair_id: pair_id.into(),
            algorithm: algorithm.into(),
            skipped: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_pair_id(&self.pair_id) && notation::validate(&self.algorithm)
    }
}

pub fn is_valid_pair_id(pair_id: &str) -> bool {
    pair_id.chars().count() == 2 && pair_id.chars().all(char::is_alphabetic)
}

pub fn reverse_pair(pair_id: &str) -> String {
    pair_id.chars().rev().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    PairId,
    Algorithm(ParseError),
}

/// An item that failed validation on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub pair_id: String,
    pub algorithm: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::PairId => {
                write!(f, "{}: {} (bad pair id)", self.pair_id, self.algorithm)
            }
            ViolationKind::Algorithm(err) => {
                write!(f, "{}: {} ({err})", self.pair_id, self.algorithm)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("no pair named {0:?} in the catalog")]
    NotFound(String),
}

/// Ordered set of practice items
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<PracticeItem>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog. Every item is kept; the ones that fail validation
    /// are returned and logged as a single warning.
    pub fn load(&mut self, items: Vec<PracticeItem>) -> Vec<Violation> {
        let violations = items
            .iter()
            .filter_map(|item| {
                let kind = if !is_valid_pair_id(&item.pair_id) {
                    ViolationKind::PairId
                } else {
                    ViolationKind::Algorithm(notation::Commutator::parse(&item.algorithm).err()?)
                };
                Some(Violation {
                    pair_id: item.pair_id.clone(),
                    algorithm: item.algorithm.clone(),
                    kind,
                })
            })
            .collect::<Vec<_>>();

        if !violations.is_empty() {
            log::warn!(
                "{} invalid algorithm(s) loaded: {}",
                violations.len(),
                violations.iter().join(", ")
            );
        }
        log::debug!("catalog loaded with {} items", items.len());

        self.items = items;
        violations
    }

    pub fn from_items(items: Vec<PracticeItem>) -> (Self, Vec<Violation>) {
        let mut catalog = Self::new();
        let violations = catalog.load(items);
        (catalog, violations)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[PracticeItem] {
        &self.items
    }

    pub fn get(&self, pair_id: &str) -> Option<&PracticeItem> {
        self.items.iter().find(|item| item.pair_id == pair_id)
    }

    /// Flip the skip flag; returns the new value.
    pub fn toggle_skip(&mut self, pair_id: &str) -> Result<bool, CatalogError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.pair_id == pair_id)
            .ok_or_else(|| CatalogError::NotFound(pair_id.to_string()))?;
        item.skipped = !item.skipped;
        Ok(item.skipped)
    }

    pub fn items_excluding_skipped(&self) -> Vec<&PracticeItem> {
        self.items.iter().filter(|item| !item.skipped).collect()
    }

    /// Items a session may draw from: not skipped and valid.
    pub fn practicable_items(&self) -> Vec<&PracticeItem> {
        self.items
            .iter()
            .filter(|item| !item.skipped && item.is_valid())
            .collect()
    }

    /// Every pair in the catalog plus its reversal, sorted and deduplicated
    pub fn known_pairs(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| [item.pair_id.clone(), reverse_pair(&item.pair_id)])
            .sorted()
            .dedup()
            .collect()
    }

    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    /// Shuffle the order, then flip a coin per item to practice the cycle in
    /// the other direction.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);

        for item in self.items.iter_mut() {
            if !rng.gen_bool(0.5) {
                continue;
            }
            // Invalid algorithms cannot be inverted; leave them in place.
            let Ok(inverted) = notation::invert(&item.algorithm) else {
                continue;
            };
            assert!(
                notation::validate(&inverted),
                "inverting {:?} produced invalid {:?}",
                item.algorithm,
                inverted
            );
            item.pair_id = reverse_pair(&item.pair_id);
            item.algorithm = inverted;
        }
    }
}
