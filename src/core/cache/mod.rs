//! Cache types.
//!
//! - [`TtlCache`] - Pod-lifetime memoization store with stale fallback

pub mod clock;
pub mod ttl;

pub use clock::{Clock, SystemClock};
pub use ttl::{Expiry, StorePolicy, TtlCache, DEFAULT_STALE_EXTENSION};
