//! Index catalog: eligibility filtering and chronological ordering.
//!
//! A catalog is rebuilt from the cluster's alias listing on every
//! retirement attempt. Skip-listed names are removed first, then the
//! remainder is put in a total order:
//!
//! 1. dated names, oldest first (ties broken by name);
//! 2. undated names, by name.
//!
//! Candidate selection never relies on sort position alone: undated
//! names only become candidates under [`UndatedPolicy::Allow`].

use std::cmp::Ordering;

use crate::index_age::index_age;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No indices to remove: {total} known, {skipped} skip-listed")]
    NoEligibleIndices { total: usize, skipped: usize },

    #[error("No dated indices to remove: {undated} eligible indices have no date suffix")]
    NoDatedIndices { undated: usize },
}

// ---------------------------------------------------------------------------
// Skip set
// ---------------------------------------------------------------------------

/// Index names that must never be deleted.
///
/// Order is preserved as given; membership is exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(Vec<String>);

impl SkipSet {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|skip| skip == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// What to do when no eligible index carries a date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndatedPolicy {
    /// Undated indices are never deleted automatically.
    #[default]
    Protect,
    /// Fall back to the first undated index (by name).
    Allow,
}

/// Total order used by the catalog: dated before undated, older first.
pub fn compare_index_names(a: &str, b: &str) -> Ordering {
    match (index_age(a), index_age(b)) {
        (Some(da), Some(db)) => da.cmp(&db).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Eligible index names in retirement order.
#[derive(Debug, Clone)]
pub struct IndexCatalog {
    names: Vec<String>,
    dated: usize,
}

impl IndexCatalog {
    /// Build the catalog from every known index name, dropping skip-listed
    /// ones.
    ///
    /// Fails with [`CatalogError::NoEligibleIndices`] when nothing remains.
    pub fn from_names<I>(names: I, skip: &SkipSet) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut total = 0;
        let mut eligible: Vec<String> = names
            .into_iter()
            .inspect(|_| total += 1)
            .filter(|name| !skip.contains(name))
            .collect();

        if eligible.is_empty() {
            return Err(CatalogError::NoEligibleIndices {
                total,
                skipped: total,
            });
        }

        eligible.sort_by(|a, b| compare_index_names(a, b));
        eligible.dedup();

        let dated = eligible
            .iter()
            .take_while(|name| index_age(name).is_some())
            .count();

        Ok(Self {
            names: eligible,
            dated,
        })
    }

    /// All eligible names, oldest dated first, undated last.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Dated names, oldest first.
    pub fn dated(&self) -> &[String] {
        &self.names[..self.dated]
    }

    /// Names without a recognisable date suffix.
    pub fn undated(&self) -> &[String] {
        &self.names[self.dated..]
    }

    /// The next index to delete.
    pub fn candidate(&self, policy: UndatedPolicy) -> Result<&str, CatalogError> {
        if let Some(oldest) = self.dated().first() {
            return Ok(oldest.as_str());
        }

        match (policy, self.undated().first()) {
            (UndatedPolicy::Allow, Some(name)) => Ok(name.as_str()),
            _ => Err(CatalogError::NoDatedIndices {
                undated: self.undated().len(),
            }),
        }
    }
}
