//! Async Rust client for the La Cuponera table store.
//!
//! The backing store is a REST table service: records live in named tables
//! (`cupones`, `ofertas`) and are addressed as
//! `{base}/v1/tables/{table}/records`. This crate owns transport mechanics,
//! the response envelope, and the raw wire record shapes. Canonical domain
//! types live in `cuponera-core`; nothing here interprets business rules.

pub mod error;
pub mod table;
pub mod transport;

pub use error::Error;
pub use table::client::{StoreConfig, TableClient};
pub use table::coupons::CreatedCoupons;
pub use table::records::{CouponFields, CouponPatch, FailedRecord, OfferFields, Record};
