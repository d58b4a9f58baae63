// ── Store adapter seam ──
//
// `CouponStore` is the persistence contract the coordinator works
// against. The production implementation wraps the REST table client
// from `cuponera-api`; tests substitute an in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use cuponera_api::{CouponFields, CouponPatch, TableClient};

use crate::error::CoreError;
use crate::model::{Coupon, CouponDraft, CouponStatus, Offer};

/// One draft the store rejected during a batch insert, by input index.
#[derive(Debug, Clone)]
pub struct RejectedDraft {
    pub index: usize,
    /// Whether the reject was a unique-index collision on the code
    /// column (retryable with a fresh code).
    pub code_collision: bool,
    pub message: Option<String>,
}

/// Result of a batch insert: what persisted plus what was rejected.
///
/// A partially persisted batch is a success value, not an error -- the
/// persisted coupons exist whether or not the caller likes the rest.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub created: Vec<Coupon>,
    pub rejected: Vec<RejectedDraft>,
}

/// Persistence contract for coupons and offers.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// All coupons owned by `owner_id`, in store order.
    async fn fetch_by_owner(&self, owner_id: &str) -> Result<Vec<Coupon>, CoreError>;

    /// Look up one coupon by its unique code.
    async fn fetch_by_code(&self, code: &str) -> Result<Option<Coupon>, CoreError>;

    /// Insert a batch of drafts. Each draft is applied independently.
    async fn insert_batch(&self, drafts: Vec<CouponDraft>) -> Result<BatchOutcome, CoreError>;

    /// Mark a coupon redeemed, stamping the redemption time.
    async fn mark_redeemed(
        &self,
        coupon_id: &str,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Coupon, CoreError>;

    /// Fetch one offer by record id.
    async fn fetch_offer(&self, offer_id: &str) -> Result<Option<Offer>, CoreError>;

    /// All published offers.
    async fn list_offers(&self) -> Result<Vec<Offer>, CoreError>;

    /// Offers in one business category (`rubro`).
    async fn list_offers_by_category(&self, category: &str) -> Result<Vec<Offer>, CoreError>;
}

// ── Production implementation ───────────────────────────────────────

/// `CouponStore` backed by the REST table store.
pub struct TableStore {
    client: TableClient,
}

impl TableStore {
    pub fn new(client: TableClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CouponStore for TableStore {
    async fn fetch_by_owner(&self, owner_id: &str) -> Result<Vec<Coupon>, CoreError> {
        let records = self.client.list_coupons_by_owner(owner_id).await?;
        Ok(records.into_iter().map(Coupon::from).collect())
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Coupon>, CoreError> {
        let record = self.client.find_coupon_by_code(code).await?;
        Ok(record.map(Coupon::from))
    }

    async fn insert_batch(&self, drafts: Vec<CouponDraft>) -> Result<BatchOutcome, CoreError> {
        let fields: Vec<CouponFields> = drafts.into_iter().map(CouponFields::from).collect();
        let created = self.client.create_coupons(fields).await?;

        let rejected = created
            .failed
            .into_iter()
            .map(|f| RejectedDraft {
                index: f.index,
                code_collision: f.is_unique_violation(),
                message: f.message,
            })
            .collect();

        Ok(BatchOutcome {
            created: created.records.into_iter().map(Coupon::from).collect(),
            rejected,
        })
    }

    async fn mark_redeemed(
        &self,
        coupon_id: &str,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Coupon, CoreError> {
        debug!(coupon_id, "marking coupon redeemed");
        let patch = CouponPatch {
            estado: CouponStatus::Redeemed.as_store_value().to_owned(),
            fecha_canje: Some(redeemed_at),
        };
        let record = self.client.update_coupon_status(coupon_id, patch).await?;
        Ok(Coupon::from(record))
    }

    async fn fetch_offer(&self, offer_id: &str) -> Result<Option<Offer>, CoreError> {
        let record = self.client.get_offer(offer_id).await?;
        Ok(record.map(Offer::from))
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, CoreError> {
        let records = self.client.list_offers().await?;
        Ok(records.into_iter().map(Offer::from).collect())
    }

    async fn list_offers_by_category(&self, category: &str) -> Result<Vec<Offer>, CoreError> {
        let records = self.client.list_offers_by_category(category).await?;
        Ok(records.into_iter().map(Offer::from).collect())
    }
}
