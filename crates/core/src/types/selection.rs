//! Filter and sort selection for the visible product list.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Which categories are visible.
///
/// Categories are an open set of strings discovered from the catalog. An
/// empty selection is always normalised to [`CategorySelection::All`].
///
/// Serialized as a JSON array of category names; `All` is the empty array.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    /// No filter: every catalog entry is visible.
    #[default]
    All,
    /// Only entries whose category is in the set.
    Only(BTreeSet<String>),
}

impl CategorySelection {
    /// Build a selection from category names.
    ///
    /// Blank names are ignored. The `"All"` sentinel (any case) or an empty
    /// input yields [`CategorySelection::All`].
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case(ALL_CATEGORIES) {
                return Self::All;
            }
            set.insert(name.to_string());
        }
        if set.is_empty() { Self::All } else { Self::Only(set) }
    }

    /// Parse the comma-separated query string form (`"a,b"`).
    #[must_use]
    pub fn from_query_value(value: &str) -> Self {
        Self::from_names(value.split(','))
    }

    /// Comma-separated form, or `None` for [`CategorySelection::All`].
    #[must_use]
    pub fn to_query_value(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Only(set) => Some(set.iter().map(String::as_str).collect::<Vec<_>>().join(",")),
        }
    }

    /// Whether this is the unfiltered selection.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a product of `category` passes this selection.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(category),
        }
    }

    /// Selected category names (empty for `All`).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::All => Vec::new(),
            Self::Only(set) => set.iter().map(String::as_str).collect(),
        }
    }
}

impl Serialize for CategorySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CategorySelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Self::from_names)
    }
}

/// Error returned when parsing an unknown sort option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort option: {0}")]
pub struct ParseSortError(pub String);

/// Ordering of the visible product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Price ascending.
    #[default]
    PriceLow,
    /// Price descending.
    PriceHigh,
    /// Title ascending.
    NameAsc,
    /// Title descending.
    NameDesc,
}

impl SortOption {
    /// All options, in menu order.
    pub const ALL: [Self; 4] = [Self::PriceLow, Self::PriceHigh, Self::NameAsc, Self::NameDesc];

    /// Stable string form used in storage and query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| ParseSortError(s.to_string()))
    }
}
