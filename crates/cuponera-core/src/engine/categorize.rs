// Categorization engine.
//
// Splits a wallet's coupons into the three presentation buckets. The
// split is a pure function of the coupon list and a single `now`
// reading; the derived "expired" state is never written back to the
// store.

use chrono::{DateTime, Utc};

use crate::model::{Coupon, CouponStatus, WalletStatistics};

/// The three wallet buckets. Disjoint and exhaustive: every input
/// coupon lands in exactly one, in its original order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CouponBuckets {
    pub available: Vec<Coupon>,
    pub redeemed: Vec<Coupon>,
    pub expired: Vec<Coupon>,
}

impl CouponBuckets {
    /// Total coupons across all buckets.
    pub fn len(&self) -> usize {
        self.available.len() + self.redeemed.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate counts plus total savings over redeemed coupons.
    pub fn statistics(&self) -> WalletStatistics {
        WalletStatistics {
            total: self.len(),
            available: self.available.len(),
            redeemed: self.redeemed.len(),
            expired: self.expired.len(),
            total_savings: self.redeemed.iter().map(Coupon::savings).sum(),
        }
    }
}

/// Categorize `coupons` into buckets as of `now`.
///
/// Redemption wins over the deadline: a redeemed coupon stays in the
/// redeemed bucket even when its use-by date has passed. An available
/// coupon whose deadline has passed (deadline equal to `now` included)
/// is presented as expired.
pub fn categorize(coupons: Vec<Coupon>, now: DateTime<Utc>) -> CouponBuckets {
    let mut buckets = CouponBuckets::default();

    for coupon in coupons {
        match coupon.status {
            CouponStatus::Redeemed => buckets.redeemed.push(coupon),
            CouponStatus::Expired => buckets.expired.push(coupon),
            CouponStatus::Available => {
                if coupon.is_past_deadline(now) {
                    buckets.expired.push(coupon);
                } else {
                    buckets.available.push(coupon);
                }
            }
        }
    }

    buckets
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::CouponCode;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn coupon(id: &str, status: CouponStatus, use_by: DateTime<Utc>) -> Coupon {
        Coupon {
            id: id.into(),
            owner_id: "user-001".into(),
            national_id: "12345678-9".into(),
            code: CouponCode::new(format!("COMAL{id}")),
            offer_id: Some("of-001".into()),
            offer_title: "2x1 en pupusas".into(),
            merchant: "Pupusería El Comal".into(),
            regular_price: 10.0,
            offer_price: 6.0,
            purchased_at: now() - chrono::Duration::days(30),
            use_by,
            redeemed_at: None,
            order_id: None,
            status,
        }
    }

    #[test]
    fn splits_by_status_and_deadline() {
        let future = now() + chrono::Duration::days(10);
        let past = now() - chrono::Duration::days(1);
        let buckets = categorize(
            vec![
                coupon("a", CouponStatus::Available, future),
                coupon("b", CouponStatus::Redeemed, future),
                coupon("c", CouponStatus::Expired, future),
                coupon("d", CouponStatus::Available, past),
            ],
            now(),
        );

        assert_eq!(buckets.available.len(), 1);
        assert_eq!(buckets.available[0].id, "a");
        assert_eq!(buckets.redeemed.len(), 1);
        assert_eq!(buckets.redeemed[0].id, "b");
        assert_eq!(buckets.expired.len(), 2);
        assert_eq!(buckets.expired[0].id, "c");
        assert_eq!(buckets.expired[1].id, "d");
    }

    #[test]
    fn redemption_wins_over_deadline() {
        let past = now() - chrono::Duration::days(5);
        let buckets = categorize(vec![coupon("a", CouponStatus::Redeemed, past)], now());

        assert_eq!(buckets.redeemed.len(), 1);
        assert!(buckets.expired.is_empty());
    }

    #[test]
    fn deadline_equal_to_now_is_expired() {
        let buckets = categorize(vec![coupon("a", CouponStatus::Available, now())], now());

        assert!(buckets.available.is_empty());
        assert_eq!(buckets.expired.len(), 1);
    }

    #[test]
    fn buckets_preserve_input_order() {
        let future = now() + chrono::Duration::days(10);
        let buckets = categorize(
            vec![
                coupon("z", CouponStatus::Available, future),
                coupon("m", CouponStatus::Available, future),
                coupon("a", CouponStatus::Available, future),
            ],
            now(),
        );

        let ids: Vec<&str> = buckets.available.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["z", "m", "a"]);
    }

    #[test]
    fn statistics_sum_savings_over_redeemed_only() {
        let future = now() + chrono::Duration::days(10);
        let mut cheap = coupon("a", CouponStatus::Redeemed, future);
        cheap.regular_price = 10.0;
        cheap.offer_price = 6.0;
        let mut dear = coupon("b", CouponStatus::Redeemed, future);
        dear.regular_price = 25.0;
        dear.offer_price = 15.0;
        let unredeemed = coupon("c", CouponStatus::Available, future);

        let stats = categorize(vec![cheap, dear, unredeemed], now()).statistics();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.redeemed, 2);
        assert_eq!(stats.expired, 0);
        assert!((stats.total_savings - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_wallet_yields_empty_buckets() {
        let buckets = categorize(Vec::new(), now());
        assert!(buckets.is_empty());
        assert_eq!(buckets.statistics(), WalletStatistics::default());
    }
}
