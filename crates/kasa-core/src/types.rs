//! # Domain Types
//!
//! Core domain types used throughout Kasa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id / sku       │   │  id (server)    │   │  id             │       │
//! │  │  price_cents    │   │  items[]        │   │  name           │       │
//! │  │  stock          │   │  total_amount   │   │  phone          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  LineItemKind   │   │    Discount     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Sale           │   │  Percent(bps)   │       │
//! │  │  800 = 8%       │   │  Return         │   │  Fixed(Money)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog (`Product`), registered customers and the authenticated
//! operator (`Staff`) are owned by external collaborators; this crate only
//! defines the snapshot shape it consumes at the interface boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::LineItem;
use crate::money::Money;
use crate::validation::sanitize_discount_value;
use crate::DEFAULT_COST_RATIO_BPS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the default rate the settings collaborator ships with)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a fraction, the settings-store convention
    /// (`0.08` for 8%).
    pub fn from_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction };
        TaxRate((fraction * 10_000.0).round().max(0.0) as u32)
    }

    /// Creates a tax rate from a percentage (`8.25` for 8.25%).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate::from_fraction(pct / 100.0)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as seen at the catalog-lookup boundary.
///
/// The catalog itself (CRUD, images, categories, suppliers) lives in an
/// external collaborator; this is the slice the cart snapshots at add-time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, also the scan target.
    pub sku: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for profit margin calculations).
    pub cost_price_cents: Option<i64>,

    /// Current stock level. Advisory only: the order-commit collaborator
    /// owns the authoritative decrement.
    pub stock: i64,

    /// Product image, carried into the cart for display.
    pub image_url: Option<String>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as Money, falling back to 70% of the sale price for
    /// products without a recorded cost.
    pub fn cost_or_default(&self) -> Money {
        match self.cost_price_cents {
            Some(cents) => Money::from_cents(cents),
            None => self.price().percent_of(DEFAULT_COST_RATIO_BPS),
        }
    }
}

// =============================================================================
// Customer & Staff
// =============================================================================

/// A registered customer, as handed over by the customer-directory
/// collaborator when the cashier binds one to a session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// The authenticated operator, used as checkout fallback attribution.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Staff {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Line Item Kind
// =============================================================================

/// Whether a cart line sells stock or takes it back.
///
/// Set once when the line is created, from the session's return-mode flag at
/// that instant. Toggling the flag later never reclassifies existing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum LineItemKind {
    /// Normal sale line, adds to the amount owed.
    Sale,
    /// Refund line, subtracts from the amount owed.
    Return,
}

impl LineItemKind {
    /// Sign applied to the line total when summing a subtotal.
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            LineItemKind::Sale => 1,
            LineItemKind::Return => -1,
        }
    }

    #[inline]
    pub const fn is_sale(&self) -> bool {
        matches!(self, LineItemKind::Sale)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount kind selector, the shape UI controls speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum DiscountKind {
    Percent,
    Fixed,
}

/// A session-level discount rule.
///
/// Modeled as a tagged variant rather than a kind/value field pair so the
/// value's unit is unambiguous: percent discounts carry basis points, fixed
/// discounts carry cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Discount {
    /// Percentage off the subtotal, in basis points (1250 = 12.5%).
    Percent(u32),
    /// Flat amount off the subtotal.
    Fixed(Money),
}

impl Discount {
    /// No discount. Sessions reset to this.
    #[inline]
    pub const fn none() -> Self {
        Discount::Fixed(Money::zero())
    }

    /// Builds a discount from UI input.
    ///
    /// `value` arrives as the number the cashier typed: whole percent for
    /// [`DiscountKind::Percent`] (12.5 → 1250 bps), major units for
    /// [`DiscountKind::Fixed`] ($10.50 → 1050 cents). NaN coerces to zero.
    pub fn from_input(kind: DiscountKind, value: f64) -> Self {
        let value = sanitize_discount_value(value);
        match kind {
            DiscountKind::Percent => Discount::Percent((value * 100.0).round() as u32),
            DiscountKind::Fixed => Discount::Fixed(Money::from_cents((value * 100.0).round() as i64)),
        }
    }

    /// The kind selector for this rule.
    pub const fn kind(&self) -> DiscountKind {
        match self {
            Discount::Percent(_) => DiscountKind::Percent,
            Discount::Fixed(_) => DiscountKind::Fixed,
        }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order record.
///
/// This engine only ever emits [`OrderStatus::Completed`]; there is no
/// deferred or pending checkout. The remaining variants exist because the
/// order-commit collaborator returns canonical orders whose status may later
/// change (returns, cancellations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    Completed,
    Pending,
    Processing,
    Cancelled,
    Returned,
}

// =============================================================================
// Order
// =============================================================================

/// The payload a finalized session hands to the order-commit collaborator.
///
/// Items are copied out of the session, never referenced, so a post-checkout
/// reset cannot reach back into a committed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraft {
    /// Line items, frozen at checkout time.
    pub items: Vec<LineItem>,

    /// Pre-discount subtotal (signed; net returns are negative).
    pub subtotal: Money,

    /// Computed discount amount, already clamped to `[0, subtotal]`.
    pub discount_amount: Money,

    /// The discount rule that produced `discount_amount`.
    pub discount: Discount,

    /// Tax on the discounted subtotal.
    pub tax_amount: Money,

    /// Grand total: subtotal − discount + tax.
    pub total_amount: Money,

    /// Always [`OrderStatus::Completed`] when built by the checkout
    /// orchestrator.
    pub status: OrderStatus,

    /// Bound customer, if any.
    pub customer_id: Option<String>,

    /// Customer display name; "Walk-in Customer" when no name was captured.
    pub customer_name: String,

    /// Salesperson attribution (session value, else the staff context).
    pub salesperson_id: Option<String>,
    pub salesperson_name: Option<String>,

    /// Cashier attribution (session value, else the staff context).
    pub cashier_id: Option<String>,
    pub cashier_name: Option<String>,

    /// When checkout was initiated.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A canonical order as returned by the order-commit collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// Server-assigned identifier.
    pub id: String,

    #[serde(flatten)]
    pub draft: OrderDraft,
}

impl Order {
    /// Wraps a committed draft with its server-assigned id.
    pub fn committed(id: impl Into<String>, draft: OrderDraft) -> Self {
        Order {
            id: id.into(),
            draft,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_fraction() {
        let rate = TaxRate::from_fraction(0.08);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_tax_rate_nan_is_zero() {
        assert_eq!(TaxRate::from_fraction(f64::NAN).bps(), 0);
    }

    #[test]
    fn test_cost_fallback_is_seventy_percent() {
        let product = Product {
            id: "p1".to_string(),
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            price_cents: 1000,
            cost_price_cents: None,
            stock: 5,
            image_url: None,
        };
        assert_eq!(product.cost_or_default().cents(), 700);

        let with_cost = Product {
            cost_price_cents: Some(450),
            ..product
        };
        assert_eq!(with_cost.cost_or_default().cents(), 450);
    }

    #[test]
    fn test_discount_from_input() {
        assert_eq!(
            Discount::from_input(DiscountKind::Percent, 12.5),
            Discount::Percent(1250)
        );
        assert_eq!(
            Discount::from_input(DiscountKind::Fixed, 10.5),
            Discount::Fixed(Money::from_cents(1050))
        );
        // NaN sanitizes to zero, matching the UI contract
        assert_eq!(
            Discount::from_input(DiscountKind::Percent, f64::NAN),
            Discount::Percent(0)
        );
    }

    #[test]
    fn test_line_item_kind_sign() {
        assert_eq!(LineItemKind::Sale.sign(), 1);
        assert_eq!(LineItemKind::Return.sign(), -1);
    }
}
