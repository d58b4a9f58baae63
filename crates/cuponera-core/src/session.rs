// Session context.

/// The signed-in buyer's identity, threaded explicitly through the
/// coordinator instead of read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Account id used to scope wallet reads and purchases.
    pub owner_id: String,
    /// National identity document number (DUI), stamped onto purchased
    /// coupons and checked at redemption.
    pub national_id: String,
}

impl SessionContext {
    pub fn new(owner_id: impl Into<String>, national_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            national_id: national_id.into(),
        }
    }
}
