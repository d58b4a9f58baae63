// Offer table endpoints (read-only)
//
// Offers are merchant-published listings; this client never writes them.
// The purchase path reads one offer to derive coupon commercial fields.

use tracing::debug;

use crate::error::Error;
use crate::table::client::TableClient;
use crate::table::records::{OfferFields, Record};

const OFFERS_TABLE: &str = "ofertas";

impl TableClient {
    /// List all offers.
    ///
    /// `GET /v1/tables/ofertas/records`
    pub async fn list_offers(&self) -> Result<Vec<Record<OfferFields>>, Error> {
        debug!("listing offers");
        self.get_records(OFFERS_TABLE, None).await
    }

    /// List offers in one category (`rubro`).
    ///
    /// `GET /v1/tables/ofertas/records?field=rubro&equals={category}`
    pub async fn list_offers_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Record<OfferFields>>, Error> {
        debug!(category, "listing offers by category");
        self.get_records(OFFERS_TABLE, Some(("rubro", category)))
            .await
    }

    /// Get a single offer by record id. Returns `None` on 404.
    ///
    /// `GET /v1/tables/ofertas/records/{id}`
    pub async fn get_offer(&self, id: &str) -> Result<Option<Record<OfferFields>>, Error> {
        debug!(id, "fetching offer");
        match self.get_record(OFFERS_TABLE, id).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
