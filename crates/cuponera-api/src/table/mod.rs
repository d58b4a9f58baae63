// Table store surface: client transport mechanics plus one endpoint
// family per file (coupons, offers), implemented as inherent methods.

pub mod client;
pub mod coupons;
pub mod offers;
pub mod records;
