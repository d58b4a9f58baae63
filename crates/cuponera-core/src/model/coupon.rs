// Coupon domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::code::CouponCode;

/// Persisted lifecycle state of a coupon.
///
/// This is what the store *says* about a coupon. A coupon whose stored
/// status is `Available` may still be presented as expired when its
/// use-by deadline has passed -- that derivation happens at
/// categorization time and is never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Available,
    Redeemed,
    Expired,
}

impl CouponStatus {
    /// Parse a stored status value.
    ///
    /// Historic rows carry both lowercase and capitalized spellings
    /// (`"disponible"` / `"Disponible"`), so matching is
    /// case-insensitive. Unknown values map to `None`.
    pub fn from_store_value(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "disponible" => Some(Self::Available),
            "canjeado" => Some(Self::Redeemed),
            "vencido" => Some(Self::Expired),
            _ => None,
        }
    }

    /// The canonical value written to the store's `estado` column.
    pub fn as_store_value(self) -> &'static str {
        match self {
            Self::Available => "disponible",
            Self::Redeemed => "canjeado",
            Self::Expired => "vencido",
        }
    }
}

/// A purchased coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Store-assigned record id.
    pub id: String,
    /// Owning buyer's account id.
    pub owner_id: String,
    /// Buyer's national identity document number (DUI).
    pub national_id: String,
    /// Unique redemption code.
    pub code: CouponCode,
    /// Source offer record id, when known.
    pub offer_id: Option<String>,
    /// Offer title at purchase time.
    pub offer_title: String,
    /// Merchant name at purchase time.
    pub merchant: String,
    /// Regular price in USD.
    pub regular_price: f64,
    /// Discounted price the buyer paid, in USD.
    pub offer_price: f64,
    /// Purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// Deadline for redeeming the coupon.
    pub use_by: DateTime<Utc>,
    /// When the coupon was redeemed, if it was.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Order that grouped this coupon's purchase batch, when known.
    pub order_id: Option<String>,
    /// Persisted lifecycle status.
    pub status: CouponStatus,
}

impl Coupon {
    /// The buyer's saving on this coupon (regular minus offer price).
    pub fn savings(&self) -> f64 {
        self.regular_price - self.offer_price
    }

    /// Whether the use-by deadline has passed at `now`.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.use_by <= now
    }
}

/// A coupon waiting to be persisted, produced by the purchase path.
///
/// Carries no record id and no status: the store assigns the id and
/// every new coupon starts out available.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponDraft {
    pub owner_id: String,
    pub national_id: String,
    pub code: CouponCode,
    pub offer_id: String,
    pub offer_title: String,
    pub merchant: String,
    pub regular_price: f64,
    pub offer_price: f64,
    pub purchased_at: DateTime<Utc>,
    pub use_by: DateTime<Utc>,
    pub order_id: String,
}

/// Aggregate wallet numbers shown next to the coupon lists.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WalletStatistics {
    pub total: usize,
    pub available: usize,
    pub redeemed: usize,
    pub expired: usize,
    /// Sum of savings over redeemed coupons, in USD.
    pub total_savings: f64,
}
