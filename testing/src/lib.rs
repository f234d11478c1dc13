//! # Storefront Testing
//!
//! Testing utilities for the storefront client.
//!
//! This crate provides:
//! - A fixed [`Clock`] for deterministic timestamps
//! - [`ReducerTest`], a Given/When/Then harness for reducers
//! - Effect assertion helpers
//! - [`InMemoryStorefront`], an in-memory stand-in for the remote service
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{test_clock, InMemoryStorefront};
//!
//! #[tokio::test]
//! async fn test_checkout_flow() {
//!     let api = InMemoryStorefront::new().with_products(vec![laptop()]);
//!     let storefront = Storefront::new(environment(api.clone()));
//!
//!     storefront.cart().send(CartAction::Load).await?;
//!     // ...
//!     assert_eq!(api.orders().len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use storefront_core::environment::Clock;

pub mod storefront_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making order dates and notification
    /// timestamps reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use storefront_mocks::{InMemoryStorefront, Operation};
