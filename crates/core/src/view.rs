//! Visible-list derivation.
//!
//! The visible list is always `sort(filter(catalog, selection), option)`.
//! Both steps work on copies; the catalog slice is never reordered.

use core::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::types::{CategorySelection, Product, SortOption};

/// Derive the visible list from scratch.
#[must_use]
pub fn derive_visible(
    catalog: &[Product],
    selection: &CategorySelection,
    option: SortOption,
) -> Vec<Product> {
    let mut visible = filter(catalog, selection);
    sort_in_place(&mut visible, option);
    visible
}

/// Catalog entries whose category passes `selection`, in catalog order.
#[must_use]
pub fn filter(catalog: &[Product], selection: &CategorySelection) -> Vec<Product> {
    catalog
        .iter()
        .filter(|product| selection.matches(&product.category))
        .cloned()
        .collect()
}

/// Stable sort of `products` by `option`.
pub fn sort_in_place(products: &mut [Product], option: SortOption) {
    match option {
        SortOption::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOption::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOption::NameAsc => products.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOption::NameDesc => products.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    }
}

/// Human-oriented title comparison.
///
/// Titles are compared by their folded form first: compatibility-decomposed,
/// combining marks dropped, lowercased. "Éclair" sorts next to "eclair" and
/// "apple" next to "Apple". Reversed exact comparison breaks ties between
/// variants, which puts "apple" before "Apple".
#[must_use]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fold_title(a)
        .cmp(fold_title(b))
        .then_with(|| b.cmp(a))
}

fn fold_title(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Distinct categories in first-seen catalog order.
#[must_use]
pub fn categories(catalog: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in catalog {
        if !seen.iter().any(|c| *c == product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}
