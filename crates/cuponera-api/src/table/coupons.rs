// Coupon table endpoints
//
// Reads filter on the `usuarioId` and `codigo` columns; writes are the
// batch create used at purchase time and the single-record status PATCH
// used at redemption time.

use tracing::debug;

use crate::error::Error;
use crate::table::client::TableClient;
use crate::table::records::{
    CouponFields, CouponPatch, CreateRequest, CreateResponse, FailedRecord, NewRecord, Record,
};

const COUPONS_TABLE: &str = "cupones";

/// Outcome of a batch create: what persisted and what the store rejected.
#[derive(Debug)]
pub struct CreatedCoupons {
    pub records: Vec<Record<CouponFields>>,
    pub failed: Vec<FailedRecord>,
}

impl TableClient {
    /// List every coupon owned by a user.
    ///
    /// `GET /v1/tables/cupones/records?field=usuarioId&equals={owner}`
    pub async fn list_coupons_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Record<CouponFields>>, Error> {
        debug!(owner_id, "listing coupons by owner");
        self.get_records(COUPONS_TABLE, Some(("usuarioId", owner_id)))
            .await
    }

    /// Find a coupon by its unique code. Returns `None` if no record
    /// matches.
    ///
    /// `GET /v1/tables/cupones/records?field=codigo&equals={code}`
    pub async fn find_coupon_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Record<CouponFields>>, Error> {
        debug!(code, "looking up coupon by code");
        let mut records: Vec<Record<CouponFields>> = self
            .get_records(COUPONS_TABLE, Some(("codigo", code)))
            .await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        })
    }

    /// Create a batch of coupons. The store applies each record
    /// independently and reports rejects per index, so a partially
    /// persisted batch is visible to the caller rather than collapsed
    /// into a single error.
    ///
    /// `POST /v1/tables/cupones/records`
    pub async fn create_coupons(
        &self,
        coupons: Vec<CouponFields>,
    ) -> Result<CreatedCoupons, Error> {
        debug!(count = coupons.len(), "creating coupon batch");
        let body = CreateRequest {
            records: coupons
                .into_iter()
                .map(|fields| NewRecord { fields })
                .collect(),
        };
        let resp: CreateResponse<CouponFields> =
            self.post_records(COUPONS_TABLE, &body).await?;
        Ok(CreatedCoupons {
            records: resp.records,
            failed: resp.failed,
        })
    }

    /// Update a coupon's status column (and redemption date, when set).
    ///
    /// `PATCH /v1/tables/cupones/records/{id}`
    pub async fn update_coupon_status(
        &self,
        id: &str,
        patch: CouponPatch,
    ) -> Result<Record<CouponFields>, Error> {
        debug!(id, estado = %patch.estado, "updating coupon status");
        self.patch_record(COUPONS_TABLE, id, patch).await
    }
}
