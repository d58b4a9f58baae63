// ── Lifecycle engines ──
//
// Pure functions over the domain model. Both engines take `now` as a
// parameter so a whole pass shares a single clock reading and tests
// can pin time.

pub mod categorize;
pub mod validate;

pub use categorize::{CouponBuckets, categorize};
pub use validate::{ValidationChecks, ValidationOutcome, validate};
