//! Page location and its view-state query parameters.
//!
//! The query string is the shareable form of the active filter and sort:
//!
//! ```text
//! ?categories=electronics,jewelery   absent means "All"
//! ?sort=price-high                   absent means the default
//! ```
//!
//! Updates replace the current entry in place (history replace, never push)
//! and leave unrelated parameters untouched.

use serde::Serialize;
use shopcart_core::{CategorySelection, SortOption};
use url::Url;

/// Query parameter carrying the category selection.
pub const CATEGORIES_PARAM: &str = "categories";

/// Query parameter carrying the sort option.
pub const SORT_PARAM: &str = "sort";

/// The current page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Track `url` as the current location.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    /// Current URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Current query string without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        self.url.query().unwrap_or_default()
    }

    /// Category selection from the query, if the parameter is present.
    #[must_use]
    pub fn categories(&self) -> Option<CategorySelection> {
        self.param(CATEGORIES_PARAM)
            .map(|value| CategorySelection::from_query_value(&value))
    }

    /// Sort option from the query, if present and recognised.
    #[must_use]
    pub fn sort(&self) -> Option<SortOption> {
        let value = self.param(SORT_PARAM)?;
        match value.parse() {
            Ok(option) => Some(option),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unrecognised sort parameter");
                None
            }
        }
    }

    /// Mirror the category selection; `All` removes the parameter.
    pub fn replace_categories(&mut self, selection: &CategorySelection) {
        self.replace_param(CATEGORIES_PARAM, selection.to_query_value().as_deref());
    }

    /// Mirror the sort option; the default option removes the parameter.
    pub fn replace_sort(&mut self, option: SortOption) {
        let sort = (option != SortOption::default()).then_some(option.as_str());
        self.replace_param(SORT_PARAM, sort);
    }

    /// Write both view-state parameters in canonical form: categories absent
    /// for `All`, sort absent for the default option.
    pub fn mirror(&mut self, selection: &CategorySelection, option: SortOption) {
        self.replace_categories(selection);
        self.replace_sort(option);
    }

    /// Strip both view-state parameters.
    pub fn clear_view_params(&mut self) {
        self.replace_param(CATEGORIES_PARAM, None);
        self.replace_param(SORT_PARAM, None);
    }

    fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn replace_param(&mut self, name: &str, value: Option<&str>) {
        let retained: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        // Keep the parameter's original position when it already existed
        let position = self
            .url
            .query_pairs()
            .position(|(key, _)| key == name)
            .unwrap_or(retained.len());

        let mut pairs = retained;
        if let Some(value) = value {
            pairs.insert(position.min(pairs.len()), (name.to_string(), value.to_string()));
        }

        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}
