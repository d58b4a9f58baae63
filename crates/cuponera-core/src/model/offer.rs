// Offer domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A merchant-published offer that coupons are purchased against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Store-assigned record id.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Regular price in USD.
    pub regular_price: f64,
    /// Discounted price in USD.
    pub offer_price: f64,
    pub discount_percent: Option<f64>,
    /// Business category (`rubro`).
    pub category: String,
    /// When the offer starts being sold, if scheduled.
    pub starts_at: Option<DateTime<Utc>>,
    /// When the offer stops being sold.
    pub sale_ends_at: DateTime<Utc>,
    /// Redemption deadline stamped onto purchased coupons. Falls back
    /// to `sale_ends_at` when the merchant didn't set one.
    pub use_by: Option<DateTime<Utc>>,
    /// Whether the merchant has the offer switched on.
    pub available: bool,
    /// Per-offer cap on coupons sold, if any.
    pub purchase_limit: Option<u32>,
    /// Coupons sold so far.
    pub sold_count: u32,
    pub merchant: String,
    /// Short merchant prefix used when generating coupon codes.
    pub company_code: String,
    pub details: Option<String>,
}

impl Offer {
    /// Whether coupons can currently be purchased against this offer.
    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        self.available
            && self.sale_ends_at > now
            && self.starts_at.is_none_or(|start| start <= now)
    }

    /// Coupons still sellable under the purchase limit, if one is set.
    pub fn remaining(&self) -> Option<u32> {
        self.purchase_limit
            .map(|limit| limit.saturating_sub(self.sold_count))
    }

    /// The redemption deadline stamped onto a coupon bought now.
    pub fn coupon_use_by(&self) -> DateTime<Utc> {
        self.use_by.unwrap_or(self.sale_ends_at)
    }
}
