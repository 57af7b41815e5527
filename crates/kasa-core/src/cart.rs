//! # Cart Session
//!
//! One parked sale: the line items, customer binding, discount rule and
//! staff attribution of a single register slot.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     CartSession Lifecycle                               │
//! │                                                                         │
//! │  ┌──────────┐  add_item   ┌──────────┐  begin_checkout  ┌────────────┐ │
//! │  │  EMPTY   │────────────►│ BUILDING │─────────────────►│  CHECKOUT  │ │
//! │  │          │             │ items>0  │                  │  PENDING   │ │
//! │  └──────────┘             └──────────┘                  └─────┬──────┘ │
//! │       ▲                        │                              │        │
//! │       │        clear()         │         complete_checkout /  │        │
//! │       ◄────────────────────────┘         abort_checkout       │        │
//! │       ◄───────────────────────────────────────────────────────┘        │
//! │                                                                         │
//! │  While CHECKOUT PENDING every content mutator returns                   │
//! │  CartError::CheckoutPending; the awaited commit owns the session.       │
//! │  Resets preserve salesperson/cashier attribution.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Adding a product freezes its price, cost, stock level and image on the
//! line. A later catalog price change never reprices a parked cart, and the
//! frozen stock level is what caps SALE quantity edits.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::pricing::Totals;
use crate::types::{Customer, Discount, DiscountKind, LineItemKind, Product, TaxRate};

// =============================================================================
// Line Item
// =============================================================================

/// One cart row.
///
/// ## Design Notes
/// - `product_id`: reference back to the catalog
/// - price/cost/stock/image are frozen copies taken at add-time, so the
///   cart displays consistent data even if the catalog changes underneath
/// - `kind` is fixed at creation from the session's return mode; toggling
///   the mode later never reclassifies a line
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Opaque id, unique within a session (UUID v4).
    pub id: String,

    /// Product ID (catalog reference).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Unit price at time of adding (frozen).
    /// This is critical: we lock in the price when added to cart.
    pub unit_price: Money,

    /// Unit cost at time of adding (frozen; 70% of price when the catalog
    /// has no cost).
    pub unit_cost: Money,

    /// Quantity, always ≥ 1.
    pub quantity: i64,

    /// Sale or return.
    pub kind: LineItemKind,

    /// Chosen variant options, attribute name → option. Empty means "no
    /// variant"; two lines merge only when these maps are equal.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selected_variants: BTreeMap<String, String>,

    /// Product stock at add-time. Caps SALE quantity edits; advisory only,
    /// the order-commit collaborator owns the authoritative check.
    pub stock_ceiling: i64,

    /// Product image at add-time, for the cart display.
    pub image_url: Option<String>,
}

impl LineItem {
    /// Creates a quantity-1 line from a product, snapshotting price, cost,
    /// stock and image.
    pub fn from_product(
        product: &Product,
        kind: LineItemKind,
        selected_variants: BTreeMap<String, String>,
    ) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price: product.price(),
            unit_cost: product.cost_or_default(),
            quantity: 1,
            kind,
            selected_variants,
            stock_ceiling: product.stock,
            image_url: product.image_url.clone(),
        }
    }

    /// Line total before sign (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Line total with the RETURN sign applied.
    pub fn signed_total(&self) -> Money {
        self.line_total() * self.kind.sign()
    }

    /// Merge key match: same product, same kind, equal variant selection.
    fn merges_with(
        &self,
        product_id: &str,
        kind: LineItemKind,
        variants: &BTreeMap<String, String>,
    ) -> bool {
        self.product_id == product_id && self.kind == kind && self.selected_variants == *variants
    }
}

// =============================================================================
// Cart Session
// =============================================================================

/// One of the register's independently addressable carts.
///
/// ## Invariants
/// - Lines are unique by (product, kind, variants); adding a duplicate
///   merges quantity instead
/// - SALE quantity never exceeds the stock ceiling
/// - Quantity is always ≥ 1; lines leave only via `remove_item`
/// - A reset (clear or successful checkout) preserves staff attribution
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSession {
    /// Line items; insertion order is display order.
    pub items: Vec<LineItem>,

    /// Bound registered customer, if any.
    pub customer_id: Option<String>,

    /// Free-text customer name (fallback when no registered customer).
    pub customer_name: String,

    /// Free-text customer phone.
    pub customer_phone: String,

    /// Salesperson attribution, survives resets.
    pub salesperson_id: Option<String>,
    pub salesperson_name: Option<String>,

    /// Cashier attribution, survives resets.
    pub cashier_id: Option<String>,
    pub cashier_name: Option<String>,

    /// Session-level discount rule.
    pub discount: Discount,

    /// While set, newly added items are RETURN lines.
    pub return_mode: bool,

    /// Updated on every content mutation.
    #[ts(as = "String")]
    pub last_modified_at: DateTime<Utc>,

    /// Set between begin_checkout and complete/abort; content mutators
    /// refuse while it holds. Not serialized: a reloaded session must never
    /// wake up locked.
    #[serde(skip)]
    checkout_pending: bool,
}

impl CartSession {
    /// Creates a new empty session.
    pub fn new() -> Self {
        CartSession {
            items: Vec::new(),
            customer_id: None,
            customer_name: String::new(),
            customer_phone: String::new(),
            salesperson_id: None,
            salesperson_name: None,
            cashier_id: None,
            cashier_name: None,
            discount: Discount::none(),
            return_mode: false,
            last_modified_at: Utc::now(),
            checkout_pending: false,
        }
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }

    /// Refuses content mutation while a commit is in flight.
    fn ensure_editable(&self) -> CartResult<()> {
        if self.checkout_pending {
            Err(CartError::CheckoutPending)
        } else {
            Ok(())
        }
    }

    // -------------------------------------------------------------------------
    // Line-item operations
    // -------------------------------------------------------------------------

    /// Adds one unit of a product to the session.
    ///
    /// ## Behavior
    /// - Kind is SALE, or RETURN while return mode is on
    /// - An existing line with the same product, kind and variant selection
    ///   merges (quantity +1) instead of duplicating
    /// - A SALE merge that would exceed the product's current stock is
    ///   refused with [`CartError::StockExceeded`] and nothing changes
    /// - Otherwise a new quantity-1 line is appended, snapshotting
    ///   price/cost/stock/image
    ///
    /// The ceiling check reads the caller's fresh `product.stock`, not the
    /// stored snapshot; the snapshot on the line stays as taken at add-time.
    pub fn add_item(
        &mut self,
        product: &Product,
        variants: BTreeMap<String, String>,
    ) -> CartResult<()> {
        self.ensure_editable()?;

        let kind = if self.return_mode {
            LineItemKind::Return
        } else {
            LineItemKind::Sale
        };

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.merges_with(&product.id, kind, &variants))
        {
            let requested = line.quantity + 1;
            if kind.is_sale() && requested > product.stock {
                return Err(CartError::StockExceeded {
                    product_id: product.id.clone(),
                    available: product.stock,
                    requested,
                });
            }
            line.quantity = requested;
        } else {
            self.items
                .push(LineItem::from_product(product, kind, variants));
        }

        self.touch();
        Ok(())
    }

    /// Removes a line unconditionally. Unknown ids are a no-op.
    pub fn remove_item(&mut self, item_id: &str) -> CartResult<()> {
        self.ensure_editable()?;
        self.items.retain(|l| l.id != item_id);
        self.touch();
        Ok(())
    }

    /// Adjusts a line's quantity by a signed delta.
    ///
    /// ## Behavior
    /// - Unknown id: [`CartError::LineNotFound`]
    /// - New quantity ≤ 0: [`CartError::QuantityNotPositive`], line kept as
    ///   is (removal happens only via [`CartSession::remove_item`])
    /// - SALE line pushed past its stock ceiling:
    ///   [`CartError::StockExceeded`], old quantity kept
    pub fn update_quantity(&mut self, item_id: &str, delta: i64) -> CartResult<()> {
        self.ensure_editable()?;

        let line = self
            .items
            .iter_mut()
            .find(|l| l.id == item_id)
            .ok_or_else(|| CartError::LineNotFound {
                item_id: item_id.to_string(),
            })?;

        let requested = line.quantity + delta;
        if requested <= 0 {
            return Err(CartError::QuantityNotPositive { requested });
        }
        if line.kind.is_sale() && requested > line.stock_ceiling {
            return Err(CartError::StockExceeded {
                product_id: line.product_id.clone(),
                available: line.stock_ceiling,
                requested,
            });
        }

        line.quantity = requested;
        self.touch();
        Ok(())
    }

    /// Empties the session back to its starting state.
    ///
    /// Items, customer binding, discount and return mode all reset;
    /// salesperson and cashier attribution survive so the next sale keeps
    /// its operator.
    pub fn clear(&mut self) -> CartResult<()> {
        self.ensure_editable()?;
        self.reset_preserving_staff();
        Ok(())
    }

    fn reset_preserving_staff(&mut self) {
        self.items.clear();
        self.customer_id = None;
        self.customer_name.clear();
        self.customer_phone.clear();
        self.discount = Discount::none();
        self.return_mode = false;
        self.checkout_pending = false;
        self.touch();
    }

    // -------------------------------------------------------------------------
    // Session setters
    // -------------------------------------------------------------------------

    /// Binds a registered customer, or clears the binding entirely when
    /// `None` (name and phone go back to empty strings).
    pub fn set_customer(&mut self, customer: Option<&Customer>) -> CartResult<()> {
        self.ensure_editable()?;
        match customer {
            Some(c) => {
                self.customer_id = Some(c.id.clone());
                self.customer_name = c.name.clone();
                self.customer_phone = c.phone.clone();
            }
            None => {
                self.customer_id = None;
                self.customer_name.clear();
                self.customer_phone.clear();
            }
        }
        self.touch();
        Ok(())
    }

    /// Sets a free-text customer name, detaching any bound registered
    /// customer.
    pub fn set_customer_name(&mut self, name: &str) -> CartResult<()> {
        self.ensure_editable()?;
        self.customer_name = name.to_string();
        self.customer_id = None;
        self.touch();
        Ok(())
    }

    /// Sets the free-text customer phone.
    pub fn set_customer_phone(&mut self, phone: &str) -> CartResult<()> {
        self.ensure_editable()?;
        self.customer_phone = phone.to_string();
        self.touch();
        Ok(())
    }

    /// Sets the salesperson attribution.
    pub fn set_salesperson(&mut self, id: &str, name: &str) -> CartResult<()> {
        self.ensure_editable()?;
        self.salesperson_id = Some(id.to_string());
        self.salesperson_name = Some(name.to_string());
        self.touch();
        Ok(())
    }

    /// Sets the cashier attribution.
    pub fn set_cashier(&mut self, id: &str, name: &str) -> CartResult<()> {
        self.ensure_editable()?;
        self.cashier_id = Some(id.to_string());
        self.cashier_name = Some(name.to_string());
        self.touch();
        Ok(())
    }

    /// Sets the session discount from raw UI input (NaN coerces to zero).
    pub fn set_discount(&mut self, kind: DiscountKind, value: f64) -> CartResult<()> {
        self.ensure_editable()?;
        self.discount = Discount::from_input(kind, value);
        self.touch();
        Ok(())
    }

    /// Flips return mode for items added from now on. Existing lines keep
    /// their kind.
    pub fn toggle_return_mode(&mut self) -> CartResult<()> {
        self.ensure_editable()?;
        self.return_mode = !self.return_mode;
        self.touch();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Checkout transitions
    // -------------------------------------------------------------------------

    /// Locks the session for an in-flight commit.
    ///
    /// Refuses on an empty cart ([`CartError::EmptyCart`]) before any
    /// external call can be made, and on a session that is already pending
    /// ([`CartError::CheckoutPending`]).
    pub fn begin_checkout(&mut self) -> CartResult<()> {
        if self.checkout_pending {
            return Err(CartError::CheckoutPending);
        }
        if self.items.is_empty() {
            return Err(CartError::EmptyCart);
        }
        self.checkout_pending = true;
        Ok(())
    }

    /// Commit succeeded: reset to empty, preserving staff attribution.
    pub fn complete_checkout(&mut self) {
        self.reset_preserving_staff();
    }

    /// Commit failed: unlock with content untouched so the operator can
    /// retry without re-entering items.
    pub fn abort_checkout(&mut self) {
        self.checkout_pending = false;
    }

    /// Whether a commit is currently in flight.
    pub fn is_checkout_pending(&self) -> bool {
        self.checkout_pending
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Checks if the session has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines (not quantity).
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Sums quantity across every line of a product, SALE and RETURN alike.
    /// The UI uses this for stock-availability hints next to the catalog.
    pub fn item_count_for_product(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    /// Runs the pricing pipeline over this session.
    pub fn totals(&self, rate: TaxRate) -> Totals {
        Totals::compute(&self.items, &self.discount, rate)
    }

    /// Subtotal convenience (signed; see [`crate::pricing::subtotal`]).
    pub fn subtotal(&self) -> Money {
        crate::pricing::subtotal(&self.items)
    }
}

impl Default for CartSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
