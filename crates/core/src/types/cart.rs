//! Shopping cart lines and totals.
//!
//! A [`Cart`] holds at most one [`CartItem`] per product id and never a line
//! with zero quantity. All mutations preserve both invariants.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// A product in the cart with its quantity.
///
/// Serialized flat (`{id, title, price, ..., qty}`) so the persisted cart
/// carries the product fields alongside the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product in this line.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity, always at least 1 inside a [`Cart`].
    pub qty: u32,
}

impl CartItem {
    /// Product id of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.qty
    }
}

/// Ordered cart contents.
///
/// Existing lines keep their position; new lines are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw lines, restoring the cart invariants.
    ///
    /// Zero-quantity lines are dropped and repeated ids are merged into the
    /// first occurrence with their quantities summed.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.qty == 0 {
                continue;
            }
            match cart.position(item.id()) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.qty = existing.qty.saturating_add(item.qty);
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Cart lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.qty))
    }

    /// Sum of all line totals, saturating at the largest representable price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `product`, creating the line if needed.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|item| item.id() == product.id) {
            Some(item) => item.qty = item.qty.saturating_add(1),
            None => self.items.push(CartItem {
                product: product.clone(),
                qty: 1,
            }),
        }
    }

    /// Increase a line's quantity by one. Returns `false` if the id is absent.
    pub fn increase(&mut self, id: ProductId) -> bool {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .map(|item| item.qty = item.qty.saturating_add(1))
            .is_some()
    }

    /// Decrease a line's quantity by one, removing the line when it reaches
    /// zero. Returns `false` if the id is absent.
    pub fn decrease(&mut self, id: ProductId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let remaining = self
            .items
            .get_mut(index)
            .map_or(0, |item| {
                item.qty = item.qty.saturating_sub(1);
                item.qty
            });
        if remaining == 0 {
            self.items.remove(index);
        }
        true
    }

    /// Remove a line entirely. Returns `false` if the id is absent.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<CartItem>::deserialize(deserializer).map(Self::from_items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents).unwrap(),
            image: format!("https://img.example/{id}.jpg"),
            description: String::new(),
            category: "misc".to_string(),
        }
    }

    fn quantities(cart: &Cart) -> Vec<(i32, u32)> {
        cart.items()
            .iter()
            .map(|item| (item.id().as_i32(), item.qty))
            .collect()
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let p1 = product(1, 1000);
        let p2 = product(2, 500);

        cart.add(&p1);
        cart.add(&p2);
        cart.add(&p1);
        cart.add(&p1);

        assert_eq!(quantities(&cart), vec![(1, 3), (2, 1)]);
    }

    #[test]
    fn test_add_increase_decrease_scenario() {
        let mut cart = Cart::new();
        let p1 = product(1, 1000);

        cart.add(&p1);
        assert_eq!(quantities(&cart), vec![(1, 1)]);
        cart.add(&p1);
        assert_eq!(quantities(&cart), vec![(1, 2)]);
        assert!(cart.decrease(p1.id));
        assert_eq!(quantities(&cart), vec![(1, 1)]);
        assert!(cart.decrease(p1.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrease_never_leaves_zero() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100));
        for _ in 0..5 {
            cart.decrease(ProductId::new(1));
            assert!(cart.items().iter().all(|item| item.qty >= 1));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100));
        let before = cart.clone();

        assert!(!cart.increase(ProductId::new(9)));
        assert!(!cart.decrease(ProductId::new(9)));
        assert!(!cart.remove(ProductId::new(9)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_keeps_order_of_others() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100));
        cart.add(&product(2, 100));
        cart.add(&product(3, 100));

        assert!(cart.remove(ProductId::new(2)));
        assert_eq!(quantities(&cart), vec![(1, 1), (3, 1)]);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1050));
        cart.add(&product(1, 1050));
        cart.add(&product(2, 199));

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2299).unwrap());
        assert_eq!(cart.items()[0].line_total(), Price::from_cents(2100).unwrap());
    }

    #[test]
    fn test_persisted_shape_round_trip() {
        let mut cart = Cart::new();
        let p1 = product(1, 1000);
        cart.add(&p1);
        cart.add(&p1);

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["qty"], 2);
        assert_eq!(json[0]["title"], "Product 1");

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_deserialize_sanitizes_lines() {
        let json = r#"[
            {"id": 1, "title": "A", "price": 1.5, "image": "", "category": "x", "qty": 2},
            {"id": 2, "title": "B", "price": 2.0, "image": "", "category": "x", "qty": 0},
            {"id": 1, "title": "A", "price": 1.5, "image": "", "category": "x", "qty": 1}
        ]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(quantities(&cart), vec![(1, 3)]);
    }

    #[test]
    fn test_totals_saturate_on_huge_prices() {
        let json = r#"[
            {"id": 1, "title": "A", "price": 5e28, "image": "", "category": "x", "qty": 2},
            {"id": 2, "title": "B", "price": 5e28, "image": "", "category": "x", "qty": 1}
        ]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.items()[0].line_total().amount(), rust_decimal::Decimal::MAX);
        assert_eq!(cart.subtotal().amount(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_total_quantity_saturates() {
        let json = format!(
            r#"[
                {{"id": 1, "title": "A", "price": 1.0, "image": "", "category": "x", "qty": {max}}},
                {{"id": 2, "title": "B", "price": 1.0, "image": "", "category": "x", "qty": 5}}
            ]"#,
            max = u32::MAX
        );

        let cart: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(cart.total_quantity(), u32::MAX);
    }
}
