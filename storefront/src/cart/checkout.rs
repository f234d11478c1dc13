//! Order placement flow
//!
//! `Idle → AwaitingConfirmation → Placing → Placed`, or back to `Idle` when
//! the user cancels or the server refuses the order. `Placed` is terminal
//! until the cart is loaded again.

use storefront_api::{OrderReceipt, OrderRequest};

/// Where the cart is in the order placement flow
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// No checkout started
    #[default]
    Idle,
    /// Waiting for the user to confirm or cancel
    AwaitingConfirmation,
    /// Order sent, waiting for the server
    Placing {
        /// Snapshot that was sent
        order: OrderRequest,
    },
    /// Server accepted the order
    Placed {
        /// Snapshot that was sent
        order: OrderRequest,
        /// Server acknowledgement
        receipt: OrderReceipt,
    },
}

impl CheckoutState {
    /// Returns `true` in [`CheckoutState::Idle`]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` while the user confirms or the order is in flight
    ///
    /// Cart mutations are refused in these states so the order matches what
    /// the user confirmed.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, Self::AwaitingConfirmation | Self::Placing { .. })
    }

    /// Returns `true` once the order was accepted
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// Order snapshot, once one was built
    #[must_use]
    pub const fn order(&self) -> Option<&OrderRequest> {
        match self {
            Self::Placing { order } | Self::Placed { order, .. } => Some(order),
            Self::Idle | Self::AwaitingConfirmation => None,
        }
    }

    /// Server acknowledgement, once the order was accepted
    #[must_use]
    pub const fn receipt(&self) -> Option<&OrderReceipt> {
        match self {
            Self::Placed { receipt, .. } => Some(receipt),
            _ => None,
        }
    }
}
