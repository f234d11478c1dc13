//! Cart state, actions and the queries views use to enable their controls

use crate::cart::checkout::CheckoutState;
use crate::notification::{NotificationId, Notifications};
use crate::session::{Phase, Session};
use std::collections::BTreeSet;
use std::sync::Arc;
use storefront_api::{
    ApiError, CartLine, CartLineId, Decimal, OrderReceipt, Product, ProductId,
};

/// Client view of the server-side cart
#[derive(Clone, Debug, Default)]
pub struct CartState {
    /// Loading phase
    pub phase: Phase,
    /// Lines in insertion order, unique by id, each with quantity ≥ 1
    pub lines: Arc<[CartLine]>,
    /// Lines with a mutation in flight
    pub pending: BTreeSet<CartLineId>,
    /// Add-to-cart requests in flight
    pub adds_in_flight: u32,
    /// Order placement flow
    pub checkout: CheckoutState,
    /// Active view instance
    pub session: Session,
    /// Pending user notifications
    pub notifications: Notifications,
}

impl CartState {
    /// Creates a new, not yet loaded `CartState`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loaded `CartState` holding `lines`
    #[must_use]
    pub fn with_lines(lines: Vec<CartLine>) -> Self {
        Self {
            phase: Phase::Ready,
            lines: lines.into(),
            ..Self::default()
        }
    }

    /// Current lines
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Shared snapshot of the current lines
    #[must_use]
    pub fn snapshot(&self) -> Arc<[CartLine]> {
        Arc::clone(&self.lines)
    }

    /// Looks up a line by id
    #[must_use]
    pub fn line(&self, id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// `Σ(price × quantity)`, computed from the current lines on every call
    ///
    /// Saturates at the bounds of [`Decimal`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.total()))
    }

    /// Returns `true` once the last load finished
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Returns `true` if `id` has a mutation in flight
    #[must_use]
    pub fn is_pending(&self, id: CartLineId) -> bool {
        self.pending.contains(&id)
    }

    /// Returns `true` if any request that changes the cart is in flight
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.adds_in_flight > 0
    }

    /// Returns `true` if the cart accepts mutations at all
    #[must_use]
    pub fn accepts_mutations(&self) -> bool {
        self.is_ready() && !self.checkout.is_in_progress()
    }

    /// Quantity `id` would have after changing it by `delta`, if that change is allowed
    #[must_use]
    pub fn quantity_after(&self, id: CartLineId, delta: i64) -> Option<u32> {
        if delta == 0 || !self.accepts_mutations() || self.is_pending(id) {
            return None;
        }
        let line = self.line(id)?;
        let target = i64::from(line.quantity).checked_add(delta)?;
        if target <= 0 {
            return None;
        }
        u32::try_from(target).ok()
    }

    /// Whether the quantity of `id` may change by `delta`
    ///
    /// False for unknown or pending lines, a zero delta, and any change that
    /// would leave the line at 0 or below. Removal is a separate action.
    #[must_use]
    pub fn can_change_quantity(&self, id: CartLineId, delta: i64) -> bool {
        self.quantity_after(id, delta).is_some()
    }

    /// Whether the quantity of `id` may be set to `quantity`
    #[must_use]
    pub fn can_set_quantity(&self, id: CartLineId, quantity: i64) -> bool {
        self.line(id).is_some_and(|line| {
            quantity
                .checked_sub(i64::from(line.quantity))
                .is_some_and(|delta| self.can_change_quantity(id, delta))
        })
    }

    /// Whether `id` may be removed
    #[must_use]
    pub fn can_remove(&self, id: CartLineId) -> bool {
        self.accepts_mutations() && !self.is_pending(id) && self.line(id).is_some()
    }

    /// Whether `quantity` units of `product` pass local validation
    #[must_use]
    pub fn can_add(&self, product: &Product, quantity: u32) -> bool {
        self.accepts_mutations() && quantity > 0 && quantity <= product.quantity_in_stock
    }

    /// Whether checkout can start
    ///
    /// Requires a loaded, non-empty cart with nothing in flight and no
    /// checkout already started.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        self.is_ready() && self.checkout.is_idle() && !self.is_empty() && !self.has_pending()
    }
}

/// Actions for the cart
///
/// Commands come from views. Events come back from effects and carry the
/// session they were issued for.
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    // Commands
    /// Read the cart from the server
    Load,
    /// Add `quantity` units of `product`
    AddLine {
        /// Product to add
        product: Product,
        /// Units to add
        quantity: u32,
    },
    /// Change a line's quantity by `delta`
    ChangeQuantity {
        /// Line to change
        line_id: CartLineId,
        /// Signed change
        delta: i64,
    },
    /// Set a line's quantity
    SetQuantity {
        /// Line to change
        line_id: CartLineId,
        /// New quantity
        quantity: i64,
    },
    /// Remove a line
    RemoveLine {
        /// Line to remove
        line_id: CartLineId,
    },
    /// Ask the user to confirm the order
    RequestCheckout,
    /// User confirmed, place the order
    ConfirmCheckout,
    /// User declined
    CancelCheckout,
    /// The view went away; ignore answers to requests it issued
    Detach,
    /// Remove a notification
    DismissNotification {
        /// Notification to remove
        id: NotificationId,
    },

    // Events
    /// Cart read
    CartLoaded {
        /// Session the request was issued for
        session: Session,
        /// Lines in server order
        lines: Vec<CartLine>,
    },
    /// Cart could not be read
    CartLoadFailed {
        /// Session the request was issued for
        session: Session,
        /// What went wrong
        error: ApiError,
    },
    /// Server created (or grew) a line
    LineAdded {
        /// Session the request was issued for
        session: Session,
        /// Line as stored by the server
        line: CartLine,
    },
    /// Server refused the add
    AddLineFailed {
        /// Session the request was issued for
        session: Session,
        /// What went wrong
        error: ApiError,
    },
    /// Server accepted a quantity change
    QuantityChanged {
        /// Session the request was issued for
        session: Session,
        /// Changed line
        line_id: CartLineId,
        /// Confirmed quantity
        quantity: u32,
    },
    /// Server refused a quantity change
    QuantityChangeFailed {
        /// Session the request was issued for
        session: Session,
        /// Line that was not changed
        line_id: CartLineId,
        /// What went wrong
        error: ApiError,
    },
    /// Server deleted a line
    LineRemoved {
        /// Session the request was issued for
        session: Session,
        /// Removed line
        line_id: CartLineId,
    },
    /// Server refused to delete a line
    RemoveLineFailed {
        /// Session the request was issued for
        session: Session,
        /// Line that was not removed
        line_id: CartLineId,
        /// What went wrong
        error: ApiError,
    },
    /// Server accepted the order
    OrderPlaced {
        /// Session the request was issued for
        session: Session,
        /// Server acknowledgement
        receipt: OrderReceipt,
    },
    /// Server refused the order
    OrderFailed {
        /// Session the request was issued for
        session: Session,
        /// What went wrong
        error: ApiError,
    },
    /// Client-side stock bookkeeping finished
    StockSynced {
        /// Session the request was issued for
        session: Session,
        /// Products whose stock was rewritten
        updated: Vec<ProductId>,
        /// Products whose stock could not be rewritten
        failed: Vec<ProductId>,
    },
}

impl CartAction {
    /// Session an event was issued for; `None` for commands
    #[must_use]
    pub const fn session(&self) -> Option<Session> {
        match self {
            Self::CartLoaded { session, .. }
            | Self::CartLoadFailed { session, .. }
            | Self::LineAdded { session, .. }
            | Self::AddLineFailed { session, .. }
            | Self::QuantityChanged { session, .. }
            | Self::QuantityChangeFailed { session, .. }
            | Self::LineRemoved { session, .. }
            | Self::RemoveLineFailed { session, .. }
            | Self::OrderPlaced { session, .. }
            | Self::OrderFailed { session, .. }
            | Self::StockSynced { session, .. } => Some(*session),
            Self::Load
            | Self::AddLine { .. }
            | Self::ChangeQuantity { .. }
            | Self::SetQuantity { .. }
            | Self::RemoveLine { .. }
            | Self::RequestCheckout
            | Self::ConfirmCheckout
            | Self::CancelCheckout
            | Self::Detach
            | Self::DismissNotification { .. } => None,
        }
    }

    /// Returns `true` for server results
    #[must_use]
    pub const fn is_event(&self) -> bool {
        self.session().is_some()
    }

    /// Returns `true` for the answers to [`CartAction::Load`]
    #[must_use]
    pub const fn is_load_result(&self) -> bool {
        matches!(self, Self::CartLoaded { .. } | Self::CartLoadFailed { .. })
    }

    /// Returns `true` for the answers to [`CartAction::ConfirmCheckout`]
    #[must_use]
    pub const fn is_order_result(&self) -> bool {
        matches!(self, Self::OrderPlaced { .. } | Self::OrderFailed { .. })
    }
}
