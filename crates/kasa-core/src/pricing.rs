//! # Pricing Calculator
//!
//! Pure functions deriving subtotal, discount, tax and total from a line-item
//! list and the session's discount rule.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Pipeline                                   │
//! │                                                                         │
//! │  items ──► subtotal = Σ unit_price × qty × sign   (RETURN sign = -1)   │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  discount_amount = 0 if subtotal ≤ 0                                   │
//! │                    else min(rule(subtotal), subtotal), floored at 0    │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  tax_amount = (subtotal - discount) × tax_rate                         │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  total = subtotal - discount + tax                                     │
//! │                                                                         │
//! │  A session of only returns is legal: subtotal, tax and total all go    │
//! │  negative (the register owes the customer).                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All math is integer cents; display rounding to a currency string happens
//! only at presentation time in the hosting UI.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::LineItem;
use crate::money::Money;
use crate::types::{Discount, TaxRate};

/// Sums line totals with RETURN lines flipped negative.
///
/// ## Example
/// ```rust
/// use kasa_core::pricing::subtotal;
///
/// assert_eq!(subtotal(&[]).cents(), 0);
/// ```
pub fn subtotal(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::signed_total).sum()
}

/// Computes the discount amount for a given subtotal.
///
/// No discount applies to a net-return or empty cart (`subtotal ≤ 0`), and
/// the result is clamped so it never exceeds the subtotal and never goes
/// negative.
pub fn discount_amount(subtotal: Money, discount: &Discount) -> Money {
    if !subtotal.is_positive() {
        return Money::zero();
    }

    let raw = match discount {
        Discount::Percent(bps) => subtotal.percent_of(*bps),
        Discount::Fixed(amount) => *amount,
    };

    raw.max(Money::zero()).min(subtotal)
}

/// Computes tax on the discounted subtotal.
///
/// Negative discounted subtotals produce negative tax: a net return hands
/// the tax back too.
pub fn tax_amount(subtotal: Money, discount: Money, rate: TaxRate) -> Money {
    (subtotal - discount).percent_of(rate.bps())
}

/// Grand total: subtotal − discount + tax.
pub fn total(subtotal: Money, discount: Money, tax: Money) -> Money {
    subtotal - discount + tax
}

// =============================================================================
// Totals Summary
// =============================================================================

/// Totals summary for one session, the shape the cart panel renders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    /// Number of lines (not quantity).
    pub line_count: usize,
    /// Total quantity across all lines, SALE and RETURN alike.
    pub total_quantity: i64,
}

impl Totals {
    /// Runs the full pipeline over a session's items.
    pub fn compute(items: &[LineItem], discount: &Discount, rate: TaxRate) -> Self {
        let sub = subtotal(items);
        let disc = discount_amount(sub, discount);
        let tax = tax_amount(sub, disc, rate);

        Totals {
            subtotal: sub,
            discount_amount: disc,
            tax_amount: tax,
            total_amount: total(sub, disc, tax),
            line_count: items.len(),
            total_quantity: items.iter().map(|i| i.quantity).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
