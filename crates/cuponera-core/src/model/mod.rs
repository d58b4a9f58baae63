// ── Canonical domain model ──
//
// Drift-free domain types. The raw Spanish wire columns (and their
// casing variants) live in `cuponera-api`; everything above the store
// boundary works with these types only.

pub mod code;
pub mod coupon;
pub mod offer;

pub use code::CouponCode;
pub use coupon::{Coupon, CouponDraft, CouponStatus, WalletStatistics};
pub use offer::Offer;
