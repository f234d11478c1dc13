//! Injected dependencies shared by the catalog and cart reducers

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use storefront_api::{StorefrontApi, UserId};
use storefront_core::environment::Clock;
use thiserror::Error;

/// Who keeps product stock in step with placed orders
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StockPolicy {
    /// The server adjusts stock when it records an order
    #[default]
    ServerManaged,
    /// After an order is placed the client rewrites each product's stock
    /// to `stock - ordered`
    ClientDecrement,
}

/// Error returned when parsing a [`StockPolicy`]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown stock policy {0:?}, expected \"server\" or \"client\"")]
pub struct ParseStockPolicyError(String);

impl FromStr for StockPolicy {
    type Err = ParseStockPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "server-managed" => Ok(Self::ServerManaged),
            "client" | "client-decrement" => Ok(Self::ClientDecrement),
            _ => Err(ParseStockPolicyError(s.to_string())),
        }
    }
}

/// Environment for the storefront reducers
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Remote storefront service
    pub api: Arc<dyn StorefrontApi>,
    /// Clock for order dates and notification timestamps
    pub clock: Arc<dyn Clock>,
    /// User orders are placed for
    pub user_id: UserId,
    /// Stock bookkeeping after an order
    pub stock_policy: StockPolicy,
    /// Auto-dismiss delay for notifications, `None` keeps them until dismissed
    pub notification_ttl: Option<Duration>,
}

impl StorefrontEnvironment {
    /// Creates a new `StorefrontEnvironment` for user 1 with server-managed stock
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            user_id: UserId(1),
            stock_policy: StockPolicy::default(),
            notification_ttl: None,
        }
    }

    /// Place orders for `user_id`
    #[must_use]
    pub const fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the stock policy
    #[must_use]
    pub const fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    /// Auto-dismiss notifications after `ttl` (errors after twice that)
    #[must_use]
    pub const fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = Some(ttl);
        self
    }
}

impl std::fmt::Debug for StorefrontEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontEnvironment")
            .field("user_id", &self.user_id)
            .field("stock_policy", &self.stock_policy)
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stock_policy() {
        assert_eq!("server".parse(), Ok(StockPolicy::ServerManaged));
        assert_eq!(" Client ".parse(), Ok(StockPolicy::ClientDecrement));
        assert!("both".parse::<StockPolicy>().is_err());
    }
}
