//! Catalog and cart state container.
//!
//! The [`Store`] owns the catalog, the derived visible list, the selected
//! product detail, the filter/sort selection and the cart. It is created
//! once at startup from its [`StoreParts`] and handed back with
//! [`Store::into_parts`] at shutdown.
//!
//! # Invariants
//!
//! - `visible == derive_visible(catalog, selection, sort)` after every call
//! - the cart has at most one line per product id and no zero quantities
//! - every mutation is written through to storage and the location before
//!   the call returns; storage failures are logged, never rolled back
//!
//! # Fetches
//!
//! The store performs no I/O of its own. A caller issues a fetch with
//! [`Store::begin_catalog_fetch`] / [`Store::begin_detail_fetch`], awaits a
//! [`CatalogSource`](crate::catalog::CatalogSource) without holding the
//! store, then settles the ticket. Results for superseded tickets are
//! discarded.

mod fetch;

pub use fetch::{CatalogRequest, DetailRequest, DetailStatus, RequestId, Settled};

use serde::Serialize;
use serde::de::DeserializeOwned;
use shopcart_core::view::{self, derive_visible};
use shopcart_core::{Cart, CategorySelection, Product, ProductId, SortOption};
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::CatalogError;
use crate::location::Location;
use crate::notifications::{Notice, Notifications};
use crate::persistence::{Storage, StorageExt, keys};

/// Collaborators a [`Store`] is built from.
pub struct StoreParts {
    /// Durable scope: catalog and cart snapshots.
    pub durable: Box<dyn Storage>,
    /// Session scope: filter and sort selection.
    pub session: Box<dyn Storage>,
    /// Current page location.
    pub location: Location,
}

/// The storefront state container.
pub struct Store {
    durable: Box<dyn Storage>,
    session: Box<dyn Storage>,
    location: Location,
    catalog: Vec<Product>,
    visible: Vec<Product>,
    selection: CategorySelection,
    sort: SortOption,
    cart: Cart,
    detail: Option<Product>,
    detail_status: DetailStatus,
    notices: Notifications,
    next_request: u64,
    pending_catalog: Option<RequestId>,
    pending_detail: Option<RequestId>,
}

impl Store {
    /// Build the store, reconciling persisted state.
    ///
    /// Filter and sort come from the location query first, then session
    /// storage, then defaults. A query value that differs from the stored
    /// one is written back to session storage. Catalog and cart are seeded
    /// from durable snapshots; unreadable snapshots count as absent.
    #[must_use]
    pub fn open(parts: StoreParts) -> Self {
        let StoreParts {
            durable,
            mut session,
            location,
        } = parts;

        let stored_selection: Option<CategorySelection> =
            read_snapshot(session.as_ref(), keys::SELECTED_CATEGORIES);
        let selection = match location.categories() {
            Some(from_url) => {
                if stored_selection.as_ref() != Some(&from_url) {
                    write_selection(session.as_mut(), &from_url);
                }
                from_url
            }
            None => stored_selection.unwrap_or_default(),
        };

        let stored_sort = read_sort(session.as_ref());
        let sort = match location.sort() {
            Some(from_url) => {
                if stored_sort != Some(from_url) {
                    write_sort(session.as_mut(), from_url);
                }
                from_url
            }
            None => stored_sort.unwrap_or_default(),
        };

        let catalog: Vec<Product> = read_snapshot(durable.as_ref(), keys::PRODUCTS)
            .or_else(|| read_snapshot(durable.as_ref(), keys::LEGACY_PRODUCTS))
            .unwrap_or_default();
        let cart: Cart = read_snapshot(durable.as_ref(), keys::CART).unwrap_or_default();

        info!(
            products = catalog.len(),
            cart_lines = cart.line_count(),
            sort = %sort,
            "Store opened"
        );

        let visible = derive_visible(&catalog, &selection, sort);
        Self {
            durable,
            session,
            location,
            catalog,
            visible,
            selection,
            sort,
            cart,
            detail: None,
            detail_status: DetailStatus::Idle,
            notices: Notifications::default(),
            next_request: 0,
            pending_catalog: None,
            pending_detail: None,
        }
    }

    /// Tear the store down, returning its collaborators.
    #[must_use]
    pub fn into_parts(self) -> StoreParts {
        StoreParts {
            durable: self.durable,
            session: self.session,
            location: self.location,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Full catalog as last fetched.
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Filtered and sorted view of the catalog.
    #[must_use]
    pub fn visible(&self) -> &[Product] {
        &self.visible
    }

    /// Distinct categories observed in the catalog.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        view::categories(&self.catalog)
    }

    /// Active category selection.
    #[must_use]
    pub const fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    /// Active sort option.
    #[must_use]
    pub const fn sort(&self) -> SortOption {
        self.sort
    }

    /// Cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Most recently loaded product detail.
    #[must_use]
    pub const fn detail(&self) -> Option<&Product> {
        self.detail.as_ref()
    }

    /// Status of the detail view.
    #[must_use]
    pub const fn detail_status(&self) -> DetailStatus {
        self.detail_status
    }

    /// Whether a catalog fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending_catalog.is_some()
    }

    /// Whether the catalog is empty and should be fetched.
    #[must_use]
    pub fn needs_catalog(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Current page location.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Look a product up in the catalog, falling back to the loaded detail.
    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.catalog
            .iter()
            .find(|p| p.id == id)
            .or_else(|| self.detail.as_ref().filter(|p| p.id == id))
    }

    /// Queue a user-facing notice.
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Take all pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Pending notices.
    #[must_use]
    pub const fn notices(&self) -> &Notifications {
        &self.notices
    }

    // =========================================================================
    // Fetch lifecycle
    // =========================================================================

    /// Issue a full-catalog fetch.
    pub fn begin_catalog_fetch(&mut self) -> CatalogRequest {
        let id = self.issue_request();
        if let Some(previous) = self.pending_catalog.replace(id) {
            debug!(?previous, "Superseding in-flight catalog request");
        }
        CatalogRequest { id }
    }

    /// Apply the outcome of a catalog fetch.
    ///
    /// Success replaces and persists the catalog, then recomputes the visible
    /// list. Failure queues an error notice and leaves everything as it was.
    /// The cart is never touched.
    pub fn settle_catalog_fetch(
        &mut self,
        request: CatalogRequest,
        result: Result<Vec<Product>, CatalogError>,
    ) -> Settled {
        if self.pending_catalog != Some(request.id) {
            debug!(request = ?request.id, "Discarding stale catalog response");
            return Settled::Stale;
        }
        self.pending_catalog = None;

        match result {
            Ok(products) => {
                info!(products = products.len(), "Catalog loaded");
                self.catalog = products;
                persist(self.durable.as_mut(), keys::PRODUCTS, &self.catalog);
                self.recompute_visible();
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch catalog");
                self.notices.push(Notice::error("Failed to load products"));
            }
        }
        Settled::Applied
    }

    /// Issue a single-product fetch.
    pub fn begin_detail_fetch(&mut self, product_id: ProductId) -> DetailRequest {
        let id = self.issue_request();
        self.pending_detail = Some(id);
        self.detail_status = DetailStatus::Loading(product_id);
        DetailRequest { id, product_id }
    }

    /// Apply the outcome of a single-product fetch.
    ///
    /// Only the most recent detail request is applied. A missing product
    /// ends in [`DetailStatus::NotFound`]; other failures queue an error
    /// notice and keep the previously selected detail.
    pub fn settle_detail_fetch(
        &mut self,
        request: DetailRequest,
        result: Result<Product, CatalogError>,
    ) -> Settled {
        if self.pending_detail != Some(request.id) {
            debug!(
                request = ?request.id,
                product_id = %request.product_id,
                "Discarding stale detail response"
            );
            return Settled::Stale;
        }
        self.pending_detail = None;

        let product_id = request.product_id;
        match result {
            Ok(product) => {
                self.detail_status = DetailStatus::Ready(product.id);
                self.detail = Some(product);
            }
            Err(e) if e.is_not_found() => {
                debug!(%product_id, "Product not found");
                self.detail_status = DetailStatus::NotFound(product_id);
            }
            Err(e) => {
                warn!(%product_id, error = %e, "Failed to fetch product");
                self.detail_status = DetailStatus::Failed(product_id);
                self.notices.push(Notice::error("Failed to load product"));
            }
        }
        Settled::Applied
    }

    // =========================================================================
    // Filter & sort
    // =========================================================================

    /// Replace the category selection.
    pub fn apply_filter(&mut self, selection: CategorySelection) {
        debug!(categories = ?selection.names(), "Applying category filter");
        self.selection = selection;
        write_selection(self.session.as_mut(), &self.selection);
        self.location.replace_categories(&self.selection);
        self.recompute_visible();
    }

    /// Replace the sort option.
    pub fn apply_sort(&mut self, option: SortOption) {
        debug!(sort = %option, "Applying sort");
        self.sort = option;
        write_sort(self.session.as_mut(), option);
        self.location.replace_sort(option);
        self.recompute_visible();
    }

    /// Back to all categories sorted by lowest price, clearing persisted and
    /// URL view state.
    pub fn reset_filters(&mut self) {
        debug!("Resetting filters");
        self.selection = CategorySelection::All;
        self.sort = SortOption::default();
        forget(self.session.as_mut(), keys::SELECTED_CATEGORIES);
        forget(self.session.as_mut(), keys::SORT_OPTION);
        self.location.clear_view_params();
        self.recompute_visible();
    }

    /// Move to a new location, letting its view parameters win.
    ///
    /// A present `categories` or `sort` parameter that differs from the
    /// active state is applied; absent parameters keep the current state.
    /// The location is then rewritten in canonical form.
    pub fn navigate(&mut self, url: Url) {
        self.location = Location::new(url);

        if let Some(selection) = self.location.categories()
            && selection != self.selection
        {
            self.apply_filter(selection);
        }
        if let Some(option) = self.location.sort()
            && option != self.sort
        {
            self.apply_sort(option);
        }
        self.location.mirror(&self.selection, self.sort);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of `product` to the cart.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add(product);
        self.persist_cart();
    }

    /// Increase a cart line by one. Returns `false` if the product is not in the cart.
    pub fn increase_qty(&mut self, id: ProductId) -> bool {
        let changed = self.cart.increase(id);
        if changed {
            self.persist_cart();
        }
        changed
    }

    /// Decrease a cart line by one, removing it at zero. Returns `false` if
    /// the product is not in the cart.
    pub fn decrease_qty(&mut self, id: ProductId) -> bool {
        let changed = self.cart.decrease(id);
        if changed {
            self.persist_cart();
        }
        changed
    }

    /// Remove a cart line. Returns `false` if the product is not in the cart.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let changed = self.cart.remove(id);
        if changed {
            self.persist_cart();
        }
        changed
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId::new(self.next_request)
    }

    fn recompute_visible(&mut self) {
        self.visible = derive_visible(&self.catalog, &self.selection, self.sort);
    }

    fn persist_cart(&mut self) {
        persist(self.durable.as_mut(), keys::CART, &self.cart);
    }
}

fn read_snapshot<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    match storage.get_json(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable stored value");
            None
        }
    }
}

fn read_sort(storage: &dyn Storage) -> Option<SortOption> {
    let raw = match storage.get(keys::SORT_OPTION) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key = keys::SORT_OPTION, error = %e, "Ignoring unreadable stored value");
            return None;
        }
    };
    raw.trim().trim_matches('"').parse().ok()
}

fn write_selection(storage: &mut dyn Storage, selection: &CategorySelection) {
    if selection.is_all() {
        forget(storage, keys::SELECTED_CATEGORIES);
    } else {
        persist(storage, keys::SELECTED_CATEGORIES, selection);
    }
}

fn write_sort(storage: &mut dyn Storage, option: SortOption) {
    if let Err(e) = storage.set(keys::SORT_OPTION, option.as_str()) {
        warn!(key = keys::SORT_OPTION, error = %e, "Failed to persist value");
    }
}

fn persist<T: Serialize + ?Sized>(storage: &mut dyn Storage, key: &str, value: &T) {
    if let Err(e) = storage.set_json(key, value) {
        warn!(key, error = %e, "Failed to persist value");
    }
}

fn forget(storage: &mut dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        warn!(key, error = %e, "Failed to clear stored value");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use shopcart_core::Price;

    use super::*;
    use crate::notifications::NoticeLevel;
    use crate::persistence::MemoryStorage;

    fn product(id: i32, category: &str, cents: i64, title: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(cents).unwrap(),
            image: format!("https://img.test/{id}.jpg"),
            description: String::new(),
            category: category.to_string(),
        }
    }

    fn scenario_catalog() -> Vec<Product> {
        vec![
            product(1, "a", 1000, "B"),
            product(2, "b", 500, "A"),
            product(3, "a", 2000, "C"),
        ]
    }

    fn parts_at(url: &str) -> StoreParts {
        StoreParts {
            durable: Box::new(MemoryStorage::new()),
            session: Box::new(MemoryStorage::new()),
            location: Location::new(Url::parse(url).unwrap()),
        }
    }

    fn empty_store() -> Store {
        Store::open(parts_at("http://shop.test/"))
    }

    fn loaded_store() -> Store {
        let mut store = empty_store();
        let request = store.begin_catalog_fetch();
        store.settle_catalog_fetch(request, Ok(scenario_catalog()));
        store
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    fn cart_lines(store: &Store) -> Vec<(i32, u32)> {
        store
            .cart()
            .items()
            .iter()
            .map(|item| (item.id().as_i32(), item.qty))
            .collect()
    }

    fn assert_view_invariant(store: &Store) {
        assert_eq!(
            store.visible(),
            derive_visible(store.catalog(), store.selection(), store.sort()).as_slice()
        );
    }

    // ---------------------------------------------------------------------
    // Initialization
    // ---------------------------------------------------------------------

    #[test]
    fn test_fresh_store_defaults() {
        let store = empty_store();
        assert!(store.needs_catalog());
        assert!(store.selection().is_all());
        assert_eq!(store.sort(), SortOption::PriceLow);
        assert!(store.cart().is_empty());
        assert!(!store.is_loading());
        assert_eq!(store.detail_status(), DetailStatus::Idle);
    }

    #[test]
    fn test_url_wins_over_session_and_is_written_back() {
        let mut parts = parts_at("http://shop.test/?categories=b&sort=name-desc");
        parts
            .session
            .set_json(keys::SELECTED_CATEGORIES, &["a"])
            .unwrap();
        parts.session.set(keys::SORT_OPTION, "price-high").unwrap();

        let store = Store::open(parts);
        assert_eq!(*store.selection(), CategorySelection::from_names(["b"]));
        assert_eq!(store.sort(), SortOption::NameDesc);

        let parts = store.into_parts();
        let stored: Vec<String> = parts.session.get_json(keys::SELECTED_CATEGORIES).unwrap().unwrap();
        assert_eq!(stored, vec!["b"]);
        assert_eq!(parts.session.get(keys::SORT_OPTION).unwrap().as_deref(), Some("name-desc"));
    }

    #[test]
    fn test_session_used_when_url_silent() {
        let mut parts = parts_at("http://shop.test/");
        parts
            .session
            .set_json(keys::SELECTED_CATEGORIES, &["a"])
            .unwrap();
        parts.session.set(keys::SORT_OPTION, "price-high").unwrap();

        let store = Store::open(parts);
        assert_eq!(*store.selection(), CategorySelection::from_names(["a"]));
        assert_eq!(store.sort(), SortOption::PriceHigh);
    }

    #[test]
    fn test_corrupt_snapshots_are_ignored() {
        let mut parts = parts_at("http://shop.test/");
        parts.durable.set(keys::CART, "{broken").unwrap();
        parts.durable.set(keys::PRODUCTS, "42").unwrap();
        parts.session.set(keys::SORT_OPTION, "cheapest").unwrap();

        let store = Store::open(parts);
        assert!(store.cart().is_empty());
        assert!(store.needs_catalog());
        assert_eq!(store.sort(), SortOption::PriceLow);
    }

    #[test]
    fn test_legacy_catalog_key() {
        let mut parts = parts_at("http://shop.test/");
        parts
            .durable
            .set_json(keys::LEGACY_PRODUCTS, &scenario_catalog())
            .unwrap();

        let store = Store::open(parts);
        assert!(!store.needs_catalog());
        assert_eq!(ids(store.visible()), vec![2, 1, 3]);
    }

    #[test]
    fn test_cart_round_trip_through_storage() {
        let mut store = loaded_store();
        let p1 = store.catalog()[0].clone();
        store.add_to_cart(&p1);
        store.add_to_cart(&p1);
        let before = store.cart().clone();

        let reopened = Store::open(store.into_parts());
        assert_eq!(*reopened.cart(), before);
        assert_eq!(cart_lines(&reopened), vec![(1, 2)]);
        assert_eq!(reopened.catalog(), scenario_catalog().as_slice());
    }

    // ---------------------------------------------------------------------
    // Catalog fetch
    // ---------------------------------------------------------------------

    #[test]
    fn test_catalog_fetch_success() {
        let mut store = empty_store();
        let request = store.begin_catalog_fetch();
        assert!(store.is_loading());

        let settled = store.settle_catalog_fetch(request, Ok(scenario_catalog()));
        assert_eq!(settled, Settled::Applied);
        assert!(!store.is_loading());
        assert_eq!(ids(store.visible()), vec![2, 1, 3]);
        assert_eq!(store.categories(), vec!["a", "b"]);
        assert_view_invariant(&store);
    }

    #[test]
    fn test_catalog_fetch_failure_keeps_state() {
        let mut store = loaded_store();
        store.apply_filter(CategorySelection::from_names(["a"]));
        let visible_before = store.visible().to_vec();
        let p1 = store.catalog()[0].clone();
        store.add_to_cart(&p1);

        let request = store.begin_catalog_fetch();
        store.settle_catalog_fetch(
            request,
            Err(CatalogError::Status {
                status: 503,
                body: String::new(),
            }),
        );

        assert!(!store.is_loading());
        assert_eq!(store.catalog(), scenario_catalog().as_slice());
        assert_eq!(store.visible(), visible_before.as_slice());
        assert_eq!(cart_lines(&store), vec![(1, 1)]);

        let notices = store.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_catalog_fetch_applies_current_filter_and_sort() {
        let mut store = empty_store();
        store.apply_filter(CategorySelection::from_names(["a"]));
        store.apply_sort(SortOption::PriceHigh);

        let request = store.begin_catalog_fetch();
        store.settle_catalog_fetch(request, Ok(scenario_catalog()));
        assert_eq!(ids(store.visible()), vec![3, 1]);
    }

    #[test]
    fn test_superseded_catalog_request_is_stale() {
        let mut store = empty_store();
        let first = store.begin_catalog_fetch();
        let second = store.begin_catalog_fetch();

        assert_eq!(
            store.settle_catalog_fetch(first, Ok(vec![product(9, "z", 100, "Z")])),
            Settled::Stale
        );
        assert!(store.is_loading());
        assert!(store.needs_catalog());

        assert_eq!(
            store.settle_catalog_fetch(second, Ok(scenario_catalog())),
            Settled::Applied
        );
        assert!(!store.is_loading());
        assert_eq!(store.catalog().len(), 3);
    }

    // ---------------------------------------------------------------------
    // Detail fetch
    // ---------------------------------------------------------------------

    #[test]
    fn test_detail_fetch_success() {
        let mut store = empty_store();
        let request = store.begin_detail_fetch(ProductId::new(2));
        assert_eq!(store.detail_status(), DetailStatus::Loading(ProductId::new(2)));

        store.settle_detail_fetch(request, Ok(product(2, "b", 500, "A")));
        assert_eq!(store.detail_status(), DetailStatus::Ready(ProductId::new(2)));
        assert_eq!(store.detail().map(|p| p.title.as_str()), Some("A"));
    }

    #[test]
    fn test_detail_not_found_is_terminal_state() {
        let mut store = empty_store();
        let id = ProductId::new(999);
        let request = store.begin_detail_fetch(id);
        store.settle_detail_fetch(request, Err(CatalogError::NotFound(id)));

        assert_eq!(store.detail_status(), DetailStatus::NotFound(id));
        assert!(store.detail().is_none());
        assert!(store.notices().is_empty());
    }

    #[test]
    fn test_detail_failure_keeps_previous_detail() {
        let mut store = empty_store();
        let request = store.begin_detail_fetch(ProductId::new(1));
        store.settle_detail_fetch(request, Ok(product(1, "a", 1000, "B")));

        let request = store.begin_detail_fetch(ProductId::new(2));
        store.settle_detail_fetch(
            request,
            Err(CatalogError::Status {
                status: 500,
                body: String::new(),
            }),
        );

        assert_eq!(store.detail_status(), DetailStatus::Failed(ProductId::new(2)));
        assert_eq!(store.detail().map(|p| p.id), Some(ProductId::new(1)));
        assert_eq!(store.drain_notices().len(), 1);
    }

    #[test]
    fn test_stale_detail_response_is_discarded() {
        let mut store = empty_store();
        let slow = store.begin_detail_fetch(ProductId::new(1));
        let fast = store.begin_detail_fetch(ProductId::new(2));

        store.settle_detail_fetch(fast, Ok(product(2, "b", 500, "A")));
        let settled = store.settle_detail_fetch(slow, Ok(product(1, "a", 1000, "B")));

        assert_eq!(settled, Settled::Stale);
        assert_eq!(store.detail().map(|p| p.id), Some(ProductId::new(2)));
        assert_eq!(store.detail_status(), DetailStatus::Ready(ProductId::new(2)));
    }

    #[test]
    fn test_detail_fetch_does_not_touch_catalog_loading() {
        let mut store = empty_store();
        let request = store.begin_detail_fetch(ProductId::new(1));
        assert!(!store.is_loading());
        store.settle_detail_fetch(request, Ok(product(1, "a", 1000, "B")));
        assert!(store.needs_catalog());
        assert!(store.find_product(ProductId::new(1)).is_some());
    }

    // ---------------------------------------------------------------------
    // Filter & sort
    // ---------------------------------------------------------------------

    #[test]
    fn test_filter_then_sort_scenario() {
        let mut store = loaded_store();

        store.apply_filter(CategorySelection::from_names(["a"]));
        assert_eq!(ids(store.visible()), vec![1, 3]);

        store.apply_sort(SortOption::PriceHigh);
        assert_eq!(ids(store.visible()), vec![3, 1]);
        assert_view_invariant(&store);
    }

    #[test]
    fn test_filter_change_uses_current_sort() {
        let mut store = loaded_store();
        store.apply_sort(SortOption::NameDesc);
        store.apply_filter(CategorySelection::from_names(["a", "b"]));
        assert_eq!(ids(store.visible()), vec![3, 1, 2]);

        store.apply_filter(CategorySelection::All);
        assert_eq!(ids(store.visible()), vec![3, 1, 2]);
        assert_view_invariant(&store);
    }

    #[test]
    fn test_filter_and_sort_mirrored() {
        let mut store = loaded_store();
        store.apply_filter(CategorySelection::from_names(["a"]));
        store.apply_sort(SortOption::NameAsc);

        assert_eq!(store.location().query(), "categories=a&sort=name-asc");

        store.apply_filter(CategorySelection::All);
        assert_eq!(store.location().query(), "sort=name-asc");

        // Default sort is left out of the URL, same as after a reset
        store.apply_sort(SortOption::PriceLow);
        assert_eq!(store.location().query(), "");

        let parts = store.into_parts();
        assert!(parts.session.get(keys::SELECTED_CATEGORIES).unwrap().is_none());
        assert_eq!(parts.session.get(keys::SORT_OPTION).unwrap().as_deref(), Some("price-low"));
    }

    #[test]
    fn test_reset_filters_idempotent() {
        let mut store = loaded_store();
        store.apply_filter(CategorySelection::from_names(["b"]));
        store.apply_sort(SortOption::NameDesc);

        store.reset_filters();
        let once = store.visible().to_vec();
        store.reset_filters();

        assert_eq!(store.visible(), once.as_slice());
        assert_eq!(ids(store.visible()), vec![2, 1, 3]);
        assert!(store.selection().is_all());
        assert_eq!(store.sort(), SortOption::PriceLow);
        assert_eq!(store.location().query(), "");

        let parts = store.into_parts();
        assert!(parts.session.get(keys::SELECTED_CATEGORIES).unwrap().is_none());
        assert!(parts.session.get(keys::SORT_OPTION).unwrap().is_none());
    }

    #[test]
    fn test_sort_does_not_reorder_catalog() {
        let mut store = loaded_store();
        store.apply_sort(SortOption::PriceHigh);
        assert_eq!(store.catalog(), scenario_catalog().as_slice());
    }

    #[test]
    fn test_navigate_applies_present_params_only() {
        let mut store = loaded_store();
        store.apply_sort(SortOption::PriceHigh);

        store.navigate(Url::parse("http://shop.test/?categories=a").unwrap());
        assert_eq!(*store.selection(), CategorySelection::from_names(["a"]));
        assert_eq!(store.sort(), SortOption::PriceHigh);
        assert_eq!(ids(store.visible()), vec![3, 1]);
        assert_eq!(store.location().query(), "categories=a&sort=price-high");

        store.navigate(Url::parse("http://shop.test/?sort=name-asc").unwrap());
        assert_eq!(*store.selection(), CategorySelection::from_names(["a"]));
        assert_eq!(ids(store.visible()), vec![1, 3]);
        assert_view_invariant(&store);
    }

    // ---------------------------------------------------------------------
    // Cart
    // ---------------------------------------------------------------------

    #[test]
    fn test_cart_scenario() {
        let mut store = loaded_store();
        let p1 = store.catalog()[0].clone();

        store.add_to_cart(&p1);
        assert_eq!(cart_lines(&store), vec![(1, 1)]);
        store.add_to_cart(&p1);
        assert_eq!(cart_lines(&store), vec![(1, 2)]);
        assert!(store.decrease_qty(p1.id));
        assert_eq!(cart_lines(&store), vec![(1, 1)]);
        assert!(store.decrease_qty(p1.id));
        assert!(cart_lines(&store).is_empty());
    }

    #[test]
    fn test_cart_mutations_write_through() {
        let mut store = loaded_store();
        let p1 = store.catalog()[0].clone();
        let p2 = store.catalog()[1].clone();
        store.add_to_cart(&p1);
        store.add_to_cart(&p2);
        assert!(store.increase_qty(p2.id));
        assert!(store.remove_item(p1.id));

        let parts = store.into_parts();
        let saved: Cart = parts.durable.get_json(keys::CART).unwrap().unwrap();
        assert_eq!(saved.items().len(), 1);
        assert_eq!(saved.items()[0].id(), p2.id);
        assert_eq!(saved.items()[0].qty, 2);
    }

    #[test]
    fn test_cart_ops_on_missing_ids() {
        let mut store = loaded_store();
        let missing = ProductId::new(42);
        assert!(!store.increase_qty(missing));
        assert!(!store.decrease_qty(missing));
        assert!(!store.remove_item(missing));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_cart_untouched_by_catalog_refresh() {
        let mut store = loaded_store();
        let p1 = store.catalog()[0].clone();
        store.add_to_cart(&p1);

        let request = store.begin_catalog_fetch();
        store.settle_catalog_fetch(request, Ok(vec![product(7, "c", 100, "New")]));
        assert_eq!(cart_lines(&store), vec![(1, 1)]);
    }
}
