// ── Lifecycle coordinator ──
//
// Single entry point for wallet consumers. Owns the session, runs the
// refresh / purchase / redeem flows against a `CouponStore`, and
// publishes the categorized wallet through a watch channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::categorize::{CouponBuckets, categorize};
use crate::engine::validate::{ValidationOutcome, validate};
use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponDraft, Offer, WalletStatistics};
use crate::session::SessionContext;
use crate::store::CouponStore;

/// Attempts per purchase at regenerating codes the store rejected as
/// duplicates. Collisions are rare (seven random digits per company),
/// so hitting this bound repeatedly means something else is wrong.
const MAX_CODE_ATTEMPTS: usize = 3;

// ── Published state ──────────────────────────────────────────────────

/// Snapshot of the signed-in buyer's wallet, published after every
/// refresh.
#[derive(Debug, Clone, Default)]
pub struct WalletState {
    pub buckets: CouponBuckets,
    pub statistics: WalletStatistics,
    /// A refresh is in flight.
    pub loading: bool,
    /// Message from the last failed refresh. Buckets keep their last
    /// good contents while this is set.
    pub error: Option<String>,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// One coupon the purchase could not persist.
#[derive(Debug, Clone)]
pub struct PurchaseFailure {
    pub message: String,
}

/// Result of a purchase: what was persisted and what was not.
#[derive(Debug)]
pub struct PurchaseOutcome {
    /// Order id grouping the batch.
    pub order_id: String,
    pub created: Vec<Coupon>,
    pub failed: Vec<PurchaseFailure>,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. All operations are direct async calls;
/// nothing runs in the background. Consumers subscribe to wallet state
/// and call the operations below, each of which reads the clock once
/// and threads that instant through categorization and validation.
pub struct Coordinator<S> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<S> {
    store: S,
    session: Mutex<Option<SessionContext>>,
    state: watch::Sender<Arc<WalletState>>,
}

impl<S: CouponStore> Coordinator<S> {
    /// Create a coordinator with no active session.
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(Arc::new(WalletState::default()));
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                session: Mutex::new(None),
                state,
            }),
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Subscribe to wallet state updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WalletState>> {
        self.inner.state.subscribe()
    }

    /// The current wallet state snapshot.
    pub fn state(&self) -> Arc<WalletState> {
        Arc::clone(&self.inner.state.borrow())
    }

    // ── Session ──────────────────────────────────────────────────

    /// Set the active session. Resets published state; call
    /// [`refresh()`](Self::refresh) to load the new buyer's wallet.
    pub async fn sign_in(&self, session: SessionContext) {
        *self.inner.session.lock().await = Some(session);
        self.inner.state.send_replace(Arc::new(WalletState::default()));
    }

    /// Clear the active session and published state.
    pub async fn sign_out(&self) {
        *self.inner.session.lock().await = None;
        self.inner.state.send_replace(Arc::new(WalletState::default()));
    }

    /// The active session, if any.
    pub async fn session(&self) -> Option<SessionContext> {
        self.inner.session.lock().await.clone()
    }

    async fn require_session(&self, operation: &'static str) -> Result<SessionContext, CoreError> {
        self.inner
            .session
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NoSession { operation })
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Reload the signed-in buyer's wallet from the store and publish
    /// the categorized result.
    ///
    /// On failure the previous buckets stay published, with the error
    /// message set alongside them, and the error is also returned.
    pub async fn refresh(&self) -> Result<Arc<WalletState>, CoreError> {
        let session = self.require_session("refresh").await?;

        self.inner.state.send_modify(|state| {
            let mut next = (**state).clone();
            next.loading = true;
            *state = Arc::new(next);
        });

        match self.inner.store.fetch_by_owner(&session.owner_id).await {
            Ok(coupons) => {
                let now = Utc::now();
                let buckets = categorize(coupons, now);
                let statistics = buckets.statistics();
                debug!(
                    available = statistics.available,
                    redeemed = statistics.redeemed,
                    expired = statistics.expired,
                    "wallet refreshed"
                );
                let next = Arc::new(WalletState {
                    buckets,
                    statistics,
                    loading: false,
                    error: None,
                    last_refresh: Some(now),
                });
                self.inner.state.send_replace(Arc::clone(&next));
                Ok(next)
            }
            Err(e) => {
                self.inner.state.send_modify(|state| {
                    let mut next = (**state).clone();
                    next.loading = false;
                    next.error = Some(e.to_string());
                    *state = Arc::new(next);
                });
                Err(e)
            }
        }
    }

    /// Refresh after a write. A failed reload is logged and swallowed
    /// rather than propagated; the write's own outcome is what the
    /// caller cares about.
    async fn refresh_after_mutation(&self, operation: &str) {
        if let Err(e) = self.refresh().await {
            warn!(operation, error = %e, "post-mutation wallet refresh failed");
        }
    }

    // ── Purchase ─────────────────────────────────────────────────

    /// Buy `quantity` coupons against an offer.
    ///
    /// Each coupon gets its own freshly generated code; codes the
    /// store rejects as duplicates are regenerated and retried a
    /// bounded number of times. A partially persisted batch is
    /// reported as such -- persisted coupons are never rolled back.
    pub async fn purchase(
        &self,
        offer_id: &str,
        quantity: usize,
    ) -> Result<PurchaseOutcome, CoreError> {
        let session = self.require_session("purchase").await?;

        if quantity == 0 {
            return Err(CoreError::PurchaseRejected {
                reason: "quantity must be at least 1".into(),
            });
        }

        let offer = self
            .inner
            .store
            .fetch_offer(offer_id)
            .await?
            .ok_or_else(|| CoreError::OfferNotFound { id: offer_id.into() })?;

        let now = Utc::now();
        check_purchasable(&offer, quantity, now)?;

        let order_id = Uuid::new_v4().to_string();
        let mut pending: Vec<CouponDraft> = (0..quantity)
            .map(|_| draft_for(&offer, &session, &order_id, now))
            .collect();

        let mut created = Vec::with_capacity(quantity);
        let mut failed = Vec::new();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let batch = std::mem::take(&mut pending);
            let batch_len = batch.len();
            let outcome = match self.inner.store.insert_batch(batch).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Earlier rounds may already have persisted coupons,
                    // so the error folds into the outcome instead of
                    // discarding them.
                    warn!(attempt, error = %e, "coupon batch insert failed");
                    let message = format!("batch insert failed: {e}");
                    failed.extend(
                        std::iter::repeat_with(|| PurchaseFailure {
                            message: message.clone(),
                        })
                        .take(batch_len),
                    );
                    break;
                }
            };
            created.extend(outcome.created);

            for reject in outcome.rejected {
                if reject.index >= batch_len {
                    failed.push(PurchaseFailure {
                        message: format!("store rejected an unknown entry: {reject:?}"),
                    });
                } else if reject.code_collision && attempt < MAX_CODE_ATTEMPTS {
                    debug!(attempt, "coupon code collision, regenerating");
                    pending.push(draft_for(&offer, &session, &order_id, now));
                } else {
                    failed.push(PurchaseFailure {
                        message: reject
                            .message
                            .unwrap_or_else(|| "rejected by the store".into()),
                    });
                }
            }

            if pending.is_empty() {
                break;
            }
        }

        // The store was asked to write either way, so published buckets
        // are reconciled with whatever actually persisted.
        self.refresh_after_mutation("purchase").await;

        if created.is_empty() {
            return Err(CoreError::PurchaseFailed {
                message: failed
                    .first()
                    .map_or_else(|| "no coupons were persisted".into(), |f| f.message.clone()),
            });
        }

        Ok(PurchaseOutcome {
            order_id,
            created,
            failed,
        })
    }

    // ── Redemption ───────────────────────────────────────────────

    /// Look up a coupon by code without touching it.
    pub async fn lookup(&self, code: &str) -> Result<Option<Coupon>, CoreError> {
        self.inner.store.fetch_by_code(code).await
    }

    /// Validate a coupon for redemption without redeeming it.
    ///
    /// `presented_national_id` is the DUI shown at the counter; it must
    /// match the buyer recorded on the coupon.
    pub async fn validate_code(
        &self,
        code: &str,
        presented_national_id: &str,
    ) -> Result<ValidationOutcome, CoreError> {
        let coupon = self.inner.store.fetch_by_code(code).await?;
        Ok(validate(coupon.as_ref(), presented_national_id, Utc::now()))
    }

    /// Redeem a coupon by code.
    ///
    /// Runs the full validation first and re-throws failures: an
    /// unknown code is [`CoreError::CouponNotFound`], a failed check is
    /// [`CoreError::RedemptionRejected`] carrying the check breakdown,
    /// and either way the coupon is left untouched.
    pub async fn redeem(
        &self,
        code: &str,
        presented_national_id: &str,
    ) -> Result<Coupon, CoreError> {
        let coupon = self.inner.store.fetch_by_code(code).await?;
        let now = Utc::now();
        let validation = validate(coupon.as_ref(), presented_national_id, now);

        if !validation.valid {
            debug!(code, message = validation.message, "redemption rejected");
            return Err(if validation.checks.exists {
                CoreError::RedemptionRejected {
                    reason: validation.message,
                    checks: validation.checks,
                }
            } else {
                CoreError::CouponNotFound { code: code.into() }
            });
        }

        // Validation passed, so the coupon exists.
        let found = coupon.ok_or_else(|| {
            CoreError::Internal("validation passed without a coupon".into())
        })?;
        let updated = self.inner.store.mark_redeemed(&found.id, now).await?;
        debug!(code, coupon_id = %updated.id, "coupon redeemed");

        // Only the coupon owner's own wallet is published; merchant-side
        // redemptions without a session have nothing to refresh.
        if self.inner.session.lock().await.is_some() {
            self.refresh_after_mutation("redeem").await;
        }

        Ok(updated)
    }

    // ── Offers ───────────────────────────────────────────────────

    /// All published offers.
    pub async fn offers(&self) -> Result<Vec<Offer>, CoreError> {
        self.inner.store.list_offers().await
    }

    /// One offer by id.
    pub async fn offer(&self, offer_id: &str) -> Result<Offer, CoreError> {
        self.inner
            .store
            .fetch_offer(offer_id)
            .await?
            .ok_or_else(|| CoreError::OfferNotFound { id: offer_id.into() })
    }

    /// Offers in one business category.
    pub async fn offers_by_category(&self, category: &str) -> Result<Vec<Offer>, CoreError> {
        self.inner.store.list_offers_by_category(category).await
    }

    /// Distinct business categories across published offers, sorted.
    pub async fn categories(&self) -> Result<Vec<String>, CoreError> {
        let offers = self.inner.store.list_offers().await?;
        let mut categories: Vec<String> = offers.into_iter().map(|o| o.category).collect();
        categories.sort_unstable();
        categories.dedup();
        Ok(categories)
    }
}

// ── Purchase helpers ─────────────────────────────────────────────────

fn check_purchasable(offer: &Offer, quantity: usize, now: DateTime<Utc>) -> Result<(), CoreError> {
    if !offer.is_on_sale(now) {
        return Err(CoreError::PurchaseRejected {
            reason: format!("offer \"{}\" is no longer on sale", offer.title),
        });
    }
    if let Some(remaining) = offer.remaining() {
        if quantity > remaining as usize {
            return Err(CoreError::PurchaseRejected {
                reason: format!(
                    "offer \"{}\" has {remaining} coupons left, {quantity} requested",
                    offer.title
                ),
            });
        }
    }
    Ok(())
}

fn draft_for(
    offer: &Offer,
    session: &SessionContext,
    order_id: &str,
    now: DateTime<Utc>,
) -> CouponDraft {
    // RNG is scoped here so purchase futures stay Send.
    let code = CouponCode::generate(&offer.company_code, &mut rand::thread_rng());
    CouponDraft {
        owner_id: session.owner_id.clone(),
        national_id: session.national_id.clone(),
        code,
        offer_id: offer.id.clone(),
        offer_title: offer.title.clone(),
        merchant: offer.merchant.clone(),
        regular_price: offer.regular_price,
        offer_price: offer.offer_price,
        purchased_at: now,
        use_by: offer.coupon_use_by(),
        order_id: order_id.to_owned(),
    }
}
