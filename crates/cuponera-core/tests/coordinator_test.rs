#![allow(clippy::unwrap_used)]
// Coordinator flow tests against an in-memory store.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use cuponera_core::engine::validate::{
    MSG_ALREADY_REDEEMED, MSG_IDENTITY_MISMATCH, MSG_NOT_FOUND,
};
use cuponera_core::store::{BatchOutcome, CouponStore, RejectedDraft};
use cuponera_core::{
    Coordinator, CoreError, Coupon, CouponCode, CouponDraft, CouponStatus, Offer, SessionContext,
};

// ── In-memory store ─────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
    coupons: Mutex<Vec<Coupon>>,
    offers: Mutex<Vec<Offer>>,
    /// Number of upcoming `insert_batch` calls that reject the first
    /// draft as a code collision (the rest of the batch persists).
    collide_batches: AtomicUsize,
    /// Number of upcoming `insert_batch` calls that fail outright with
    /// a store error, after any pending collisions are spent.
    fail_inserts: AtomicUsize,
    /// When set, `fetch_by_owner` fails with a store error.
    fail_fetches: AtomicUsize,
    fetch_by_owner_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MemoryStore {
    fn seed_coupon(&self, coupon: Coupon) {
        self.coupons.lock().unwrap().push(coupon);
    }

    fn seed_offer(&self, offer: Offer) {
        self.offers.lock().unwrap().push(offer);
    }

    fn materialize(&self, draft: CouponDraft) -> Coupon {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Coupon {
            id: format!("rec{n:03}"),
            owner_id: draft.owner_id,
            national_id: draft.national_id,
            code: draft.code,
            offer_id: Some(draft.offer_id),
            offer_title: draft.offer_title,
            merchant: draft.merchant,
            regular_price: draft.regular_price,
            offer_price: draft.offer_price,
            purchased_at: draft.purchased_at,
            use_by: draft.use_by,
            redeemed_at: None,
            order_id: Some(draft.order_id),
            status: CouponStatus::Available,
        }
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn fetch_by_owner(&self, owner_id: &str) -> Result<Vec<Coupon>, CoreError> {
        self.fetch_by_owner_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) > 0 {
            self.fail_fetches.fetch_sub(1, Ordering::SeqCst);
            return Err(CoreError::ConnectionFailed {
                reason: "store unreachable".into(),
            });
        }
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Coupon>, CoreError> {
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code.as_str() == code)
            .cloned())
    }

    async fn insert_batch(&self, drafts: Vec<CouponDraft>) -> Result<BatchOutcome, CoreError> {
        if self.collide_batches.load(Ordering::SeqCst) > 0 {
            self.collide_batches.fetch_sub(1, Ordering::SeqCst);
            let created: Vec<Coupon> = drafts
                .into_iter()
                .skip(1)
                .map(|draft| self.materialize(draft))
                .collect();
            self.coupons.lock().unwrap().extend(created.iter().cloned());
            return Ok(BatchOutcome {
                created,
                rejected: vec![RejectedDraft {
                    index: 0,
                    code_collision: true,
                    message: Some("codigo already exists".into()),
                }],
            });
        }

        if self.fail_inserts.load(Ordering::SeqCst) > 0 {
            self.fail_inserts.fetch_sub(1, Ordering::SeqCst);
            return Err(CoreError::ConnectionFailed {
                reason: "store unreachable".into(),
            });
        }

        let created: Vec<Coupon> = drafts
            .into_iter()
            .map(|draft| self.materialize(draft))
            .collect();
        self.coupons.lock().unwrap().extend(created.iter().cloned());
        Ok(BatchOutcome {
            created,
            rejected: Vec::new(),
        })
    }

    async fn mark_redeemed(
        &self,
        coupon_id: &str,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Coupon, CoreError> {
        let mut coupons = self.coupons.lock().unwrap();
        let coupon = coupons
            .iter_mut()
            .find(|c| c.id == coupon_id)
            .ok_or_else(|| CoreError::CouponNotFound {
                code: coupon_id.into(),
            })?;
        coupon.status = CouponStatus::Redeemed;
        coupon.redeemed_at = Some(redeemed_at);
        Ok(coupon.clone())
    }

    async fn fetch_offer(&self, offer_id: &str) -> Result<Option<Offer>, CoreError> {
        Ok(self
            .offers
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == offer_id)
            .cloned())
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, CoreError> {
        Ok(self.offers.lock().unwrap().clone())
    }

    async fn list_offers_by_category(&self, category: &str) -> Result<Vec<Offer>, CoreError> {
        Ok(self
            .offers
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.category == category)
            .cloned()
            .collect())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn session() -> SessionContext {
    SessionContext::new("user-001", "12345678-9")
}

fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

fn coupon(id: &str, code: &str, status: CouponStatus, use_by: DateTime<Utc>) -> Coupon {
    Coupon {
        id: id.into(),
        owner_id: "user-001".into(),
        national_id: "12345678-9".into(),
        code: CouponCode::new(code),
        offer_id: Some("of-001".into()),
        offer_title: "2x1 en pupusas".into(),
        merchant: "Pupusería El Comal".into(),
        regular_price: 10.0,
        offer_price: 6.0,
        purchased_at: Utc::now() - Duration::days(10),
        use_by,
        redeemed_at: None,
        order_id: None,
        status,
    }
}

fn offer(id: &str) -> Offer {
    Offer {
        id: id.into(),
        title: "2x1 en pupusas".into(),
        description: None,
        image_url: None,
        regular_price: 10.0,
        offer_price: 6.0,
        discount_percent: Some(40.0),
        category: "restaurantes".into(),
        starts_at: None,
        sale_ends_at: far_future(),
        use_by: Some(far_future()),
        available: true,
        purchase_limit: None,
        sold_count: 0,
        merchant: "Pupusería El Comal".into(),
        company_code: "COMAL".into(),
        details: None,
    }
}

async fn signed_in(store: MemoryStore) -> Coordinator<MemoryStore> {
    let coordinator = Coordinator::new(store);
    coordinator.sign_in(session()).await;
    coordinator
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_categorizes_and_publishes() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1111111",
        CouponStatus::Available,
        far_future(),
    ));
    store.seed_coupon(coupon(
        "rec-b",
        "COMAL2222222",
        CouponStatus::Redeemed,
        far_future(),
    ));
    store.seed_coupon(coupon(
        "rec-c",
        "COMAL3333333",
        CouponStatus::Available,
        Utc::now() - Duration::days(1),
    ));
    let coordinator = signed_in(store).await;

    let state = coordinator.refresh().await.unwrap();

    assert_eq!(state.statistics.available, 1);
    assert_eq!(state.statistics.redeemed, 1);
    assert_eq!(state.statistics.expired, 1);
    assert!((state.statistics.total_savings - 4.0).abs() < f64::EPSILON);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert!(state.last_refresh.is_some());

    // Subscribers see the same snapshot.
    let seen = coordinator.subscribe().borrow().clone();
    assert_eq!(seen.statistics, state.statistics);
}

#[tokio::test]
async fn refresh_is_idempotent_without_mutations() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1111111",
        CouponStatus::Available,
        far_future(),
    ));
    store.seed_coupon(coupon(
        "rec-b",
        "COMAL2222222",
        CouponStatus::Redeemed,
        far_future(),
    ));
    let coordinator = signed_in(store).await;

    let first = coordinator.refresh().await.unwrap();
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(first.buckets, second.buckets);
}

#[tokio::test]
async fn refresh_failure_preserves_buckets_and_reports_error() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1111111",
        CouponStatus::Available,
        far_future(),
    ));
    let coordinator = signed_in(store).await;
    coordinator.refresh().await.unwrap();

    // Next fetch fails; the published buckets must survive.
    let inner_state = coordinator.state();
    assert_eq!(inner_state.statistics.available, 1);

    coordinator.store().fail_fetches.store(1, Ordering::SeqCst);
    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::ConnectionFailed { .. }));

    let state = coordinator.state();
    assert_eq!(state.statistics.available, 1, "buckets kept on failure");
    assert!(state.error.is_some());
    assert!(!state.loading);
}

#[tokio::test]
async fn refresh_without_session_is_rejected() {
    let coordinator = Coordinator::new(MemoryStore::default());
    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::NoSession { .. }));
}

// ── Purchase ────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_creates_coded_coupons_and_refreshes() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    let coordinator = signed_in(store).await;

    let outcome = coordinator.purchase("of-001", 3).await.unwrap();

    assert_eq!(outcome.created.len(), 3);
    assert!(outcome.failed.is_empty());
    let codes: HashSet<&str> = outcome.created.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes.len(), 3, "every coupon gets its own code");
    for c in &outcome.created {
        assert!(c.code.as_str().starts_with("COMAL"));
        assert_eq!(c.status, CouponStatus::Available);
        assert_eq!(c.order_id.as_deref(), Some(outcome.order_id.as_str()));
        assert_eq!(c.national_id, "12345678-9");
    }

    // The wallet was refreshed with the new coupons.
    let state = coordinator.state();
    assert_eq!(state.statistics.available, 3);
}

#[tokio::test]
async fn purchase_unknown_offer_fails() {
    let coordinator = signed_in(MemoryStore::default()).await;
    let err = coordinator.purchase("ghost", 1).await.unwrap_err();
    assert!(matches!(err, CoreError::OfferNotFound { .. }));
}

#[tokio::test]
async fn purchase_of_offer_off_sale_is_rejected() {
    let store = MemoryStore::default();
    let mut stale = offer("of-001");
    stale.sale_ends_at = Utc::now() - Duration::days(1);
    store.seed_offer(stale);
    let coordinator = signed_in(store).await;

    let err = coordinator.purchase("of-001", 1).await.unwrap_err();
    assert!(matches!(err, CoreError::PurchaseRejected { .. }));
}

#[tokio::test]
async fn purchase_over_the_limit_is_rejected() {
    let store = MemoryStore::default();
    let mut capped = offer("of-001");
    capped.purchase_limit = Some(10);
    capped.sold_count = 9;
    store.seed_offer(capped);
    let coordinator = signed_in(store).await;

    let err = coordinator.purchase("of-001", 2).await.unwrap_err();
    assert!(matches!(err, CoreError::PurchaseRejected { .. }));

    // Exactly the remaining amount still goes through.
    let outcome = coordinator.purchase("of-001", 1).await.unwrap();
    assert_eq!(outcome.created.len(), 1);
}

#[tokio::test]
async fn purchase_retries_code_collisions() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    // First insert rejects one draft as a collision; the retry lands.
    store.collide_batches.store(1, Ordering::SeqCst);
    let coordinator = signed_in(store).await;

    let outcome = coordinator.purchase("of-001", 2).await.unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert!(outcome.failed.is_empty());
}

#[tokio::test]
async fn purchase_gives_up_after_bounded_collision_retries() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    // Every attempt collides; the purchase must fail rather than loop.
    store.collide_batches.store(usize::MAX, Ordering::SeqCst);
    let coordinator = signed_in(store).await;

    let err = coordinator.purchase("of-001", 1).await.unwrap_err();
    assert!(matches!(err, CoreError::PurchaseFailed { .. }));
}

#[tokio::test]
async fn purchase_insert_failure_midway_keeps_persisted_coupons() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    // First insert persists one coupon and collides on the other; the
    // retry round then fails outright.
    store.collide_batches.store(1, Ordering::SeqCst);
    store.fail_inserts.store(1, Ordering::SeqCst);
    let coordinator = signed_in(store).await;

    let outcome = coordinator.purchase("of-001", 2).await.unwrap();

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.failed.len(), 1);

    // The wallet was still refreshed with the coupon that persisted.
    let state = coordinator.state();
    assert_eq!(state.statistics.available, 1);
}

#[tokio::test]
async fn purchase_with_failed_insert_still_refreshes() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    store.fail_inserts.store(1, Ordering::SeqCst);
    let coordinator = signed_in(store).await;

    let err = coordinator.purchase("of-001", 2).await.unwrap_err();
    assert!(matches!(err, CoreError::PurchaseFailed { .. }));

    // Published buckets were reconciled even though nothing persisted.
    assert_eq!(
        coordinator.store().fetch_by_owner_calls.load(Ordering::SeqCst),
        1
    );
    assert_eq!(coordinator.state().statistics.total, 0);
}

#[tokio::test]
async fn purchase_of_zero_coupons_is_rejected() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    let coordinator = signed_in(store).await;

    let err = coordinator.purchase("of-001", 0).await.unwrap_err();
    assert!(matches!(err, CoreError::PurchaseRejected { .. }));
}

// ── Redemption ──────────────────────────────────────────────────────

#[tokio::test]
async fn redeem_valid_coupon_marks_it_redeemed() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1234567",
        CouponStatus::Available,
        far_future(),
    ));
    let coordinator = signed_in(store).await;

    let updated = coordinator
        .redeem("COMAL1234567", "12345678-9")
        .await
        .unwrap();

    assert_eq!(updated.status, CouponStatus::Redeemed);
    assert!(updated.redeemed_at.is_some());

    // The owner's wallet was refreshed with the redemption applied.
    let state = coordinator.state();
    assert_eq!(state.statistics.redeemed, 1);
}

#[tokio::test]
async fn redeem_already_redeemed_coupon_is_rejected_without_mutation() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1234567",
        CouponStatus::Redeemed,
        far_future(),
    ));
    let coordinator = signed_in(store).await;

    let err = coordinator
        .redeem("COMAL1234567", "12345678-9")
        .await
        .unwrap_err();

    match err {
        CoreError::RedemptionRejected { reason, checks } => {
            assert_eq!(reason, MSG_ALREADY_REDEEMED);
            assert!(!checks.not_redeemed);
        }
        other => panic!("expected RedemptionRejected, got: {other:?}"),
    }
    // The coupon keeps its original redemption timestamp (none set here).
    let found = coordinator.lookup("COMAL1234567").await.unwrap().unwrap();
    assert_eq!(found.redeemed_at, None);
}

#[tokio::test]
async fn redeem_with_wrong_national_id_is_rejected() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1234567",
        CouponStatus::Available,
        far_future(),
    ));
    let coordinator = signed_in(store).await;

    let err = coordinator
        .redeem("COMAL1234567", "00000000-0")
        .await
        .unwrap_err();

    match err {
        CoreError::RedemptionRejected { reason, .. } => {
            assert_eq!(reason, MSG_IDENTITY_MISMATCH);
        }
        other => panic!("expected RedemptionRejected, got: {other:?}"),
    }

    // Nothing was written.
    let found = coordinator.lookup("COMAL1234567").await.unwrap().unwrap();
    assert_eq!(found.status, CouponStatus::Available);
}

#[tokio::test]
async fn redeem_unknown_code_reports_not_found() {
    let coordinator = signed_in(MemoryStore::default()).await;

    let err = coordinator
        .redeem("NADA0000000", "12345678-9")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::CouponNotFound { .. }));

    // The read-only check reports the user-facing message.
    let outcome = coordinator
        .validate_code("NADA0000000", "12345678-9")
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.message, MSG_NOT_FOUND);
}

#[tokio::test]
async fn redeem_without_session_skips_wallet_refresh() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1234567",
        CouponStatus::Available,
        far_future(),
    ));
    let coordinator = Coordinator::new(store);

    // The merchant presents the buyer's DUI; no buyer session exists.
    let updated = coordinator
        .redeem("COMAL1234567", "12345678-9")
        .await
        .unwrap();

    assert_eq!(updated.status, CouponStatus::Redeemed);
    assert_eq!(
        coordinator.store().fetch_by_owner_calls.load(Ordering::SeqCst),
        0,
        "merchant-side redemption must not fetch a wallet"
    );
}

// ── Offers ──────────────────────────────────────────────────────────

#[tokio::test]
async fn categories_are_distinct_and_sorted() {
    let store = MemoryStore::default();
    store.seed_offer(offer("of-001"));
    let mut spa = offer("of-002");
    spa.category = "belleza".into();
    store.seed_offer(spa);
    store.seed_offer(offer("of-003"));
    let coordinator = Coordinator::new(store);

    let categories = coordinator.categories().await.unwrap();
    assert_eq!(categories, ["belleza", "restaurantes"]);

    let in_category = coordinator.offers_by_category("restaurantes").await.unwrap();
    assert_eq!(in_category.len(), 2);
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_out_clears_published_state() {
    let store = MemoryStore::default();
    store.seed_coupon(coupon(
        "rec-a",
        "COMAL1111111",
        CouponStatus::Available,
        far_future(),
    ));
    let coordinator = signed_in(store).await;
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.state().statistics.total, 1);

    coordinator.sign_out().await;

    assert_eq!(coordinator.state().statistics.total, 0);
    assert!(coordinator.session().await.is_none());
}
