//! Reducer for the cart and its order placement flow.
//!
//! Commands are validated against the current state. A command that passes
//! marks what it touches as pending and returns one request effect; nothing
//! changes in `lines` until the matching event arrives. Commands that do not
//! pass are silent no-ops, mirroring a disabled control, except for invalid
//! add-to-cart input, which the user is told about.

use crate::cart::checkout::CheckoutState;
use crate::cart::stock::sync_stock;
use crate::cart::types::{CartAction, CartState};
use crate::environment::{StockPolicy, StorefrontEnvironment};
use crate::notification::{self, Level};
use crate::session::Phase;
use std::sync::Arc;
use storefront_api::{ApiError, CartLine, CartLineId, FailureCategory, NewCartLine, OrderRequest};
use storefront_core::{
    SmallVec, async_effect, effect::Effect, reducer::Reducer, request_effect, smallvec,
};

/// Shown when a product was added
pub const ADD_SUCCESS_MESSAGE: &str = "Product added to cart successfully!";
/// Shown when the server refused an add
pub const ADD_FAILED_MESSAGE: &str = "Failed to add product to cart. Please try again.";
/// Shown when an add fails local validation
pub const INVALID_ADD_MESSAGE: &str = "Invalid product or quantity.";
/// Shown when the cart cannot be read
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch cart items";
/// Shown when a quantity change was refused
pub const QUANTITY_FAILED_MESSAGE: &str = "Failed to update quantity. Please try again.";
/// Shown when a removal was refused
pub const REMOVE_FAILED_MESSAGE: &str = "Failed to remove item from cart. Please try again.";
/// Shown when the order was accepted
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully!";
/// Shown when the order was refused
pub const ORDER_FAILED_MESSAGE: &str = "Error placing order. Please try again.";

/// Reducer for the cart
#[derive(Clone, Debug)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn notify(
        state: &mut CartState,
        env: &StorefrontEnvironment,
        level: Level,
        message: impl Into<String>,
        category: Option<FailureCategory>,
    ) -> Effect<CartAction> {
        notification::notify(&mut state.notifications, env, level, message, category, |id| {
            CartAction::DismissNotification { id }
        })
    }

    fn notify_failure(
        state: &mut CartState,
        env: &StorefrontEnvironment,
        message: &str,
        error: &ApiError,
    ) -> Effect<CartAction> {
        tracing::warn!(%error, category = %error.category(), "{message}");
        Self::notify(state, env, Level::Error, message, Some(error.category()))
    }

    /// Mark `line_id` pending and ask the server for the new quantity
    fn update_quantity(
        state: &mut CartState,
        env: &StorefrontEnvironment,
        line_id: CartLineId,
        quantity: u32,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        state.pending.insert(line_id);

        let api = Arc::clone(&env.api);
        let session = state.session;
        smallvec![request_effect! {
            call: api.update_cart_line_quantity(line_id, quantity),
            on_success: |()| Some(CartAction::QuantityChanged { session, line_id, quantity }),
            on_error: |error| Some(CartAction::QuantityChangeFailed { session, line_id, error })
        }]
    }

    /// Replace the lines with a new collection
    fn replace_lines(state: &mut CartState, lines: Vec<CartLine>) {
        state.lines = lines.into();
    }
}

impl Default for CartReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = StorefrontEnvironment;

    fn accepts(&self, state: &Self::State, action: &Self::Action) -> bool {
        action.session().is_none_or(|session| session == state.session)
    }

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if !self.accepts(state, &action) {
            tracing::debug!(
                session = ?action.session(),
                current = %state.session,
                "Ignoring cart result for a detached view"
            );
            return SmallVec::new();
        }

        match action {
            // ========== Commands ==========
            CartAction::Load => {
                if state.checkout.is_in_progress() {
                    tracing::debug!("Ignoring load while checkout is in progress");
                    return SmallVec::new();
                }
                if state.checkout.is_placed() {
                    state.checkout = CheckoutState::Idle;
                }
                state.phase = Phase::Loading;

                let api = Arc::clone(&env.api);
                let session = state.session;
                smallvec![request_effect! {
                    call: api.read_cart(),
                    on_success: |lines| Some(CartAction::CartLoaded { session, lines }),
                    on_error: |error| Some(CartAction::CartLoadFailed { session, error })
                }]
            },

            CartAction::AddLine { product, quantity } => {
                if !state.accepts_mutations() {
                    tracing::debug!(product_id = %product.id, "Ignoring add while cart is busy");
                    return SmallVec::new();
                }
                if !state.can_add(&product, quantity) {
                    tracing::debug!(
                        product_id = %product.id,
                        quantity,
                        stock = product.quantity_in_stock,
                        "Rejected add"
                    );
                    return smallvec![Self::notify(
                        state,
                        env,
                        Level::Error,
                        INVALID_ADD_MESSAGE,
                        Some(FailureCategory::Validation),
                    )];
                }

                state.adds_in_flight = state.adds_in_flight.saturating_add(1);

                let request = NewCartLine::for_product(&product, quantity);
                let api = Arc::clone(&env.api);
                let session = state.session;
                smallvec![request_effect! {
                    call: api.add_cart_line(request),
                    on_success: |line| Some(CartAction::LineAdded { session, line }),
                    on_error: |error| Some(CartAction::AddLineFailed { session, error })
                }]
            },

            CartAction::ChangeQuantity { line_id, delta } => {
                let Some(quantity) = state.quantity_after(line_id, delta) else {
                    tracing::trace!(%line_id, delta, "Ignoring quantity change");
                    return SmallVec::new();
                };
                Self::update_quantity(state, env, line_id, quantity)
            },

            CartAction::SetQuantity { line_id, quantity } => {
                if !state.can_set_quantity(line_id, quantity) {
                    tracing::trace!(%line_id, quantity, "Ignoring quantity change");
                    return SmallVec::new();
                }
                let Ok(quantity) = u32::try_from(quantity) else {
                    return SmallVec::new();
                };
                Self::update_quantity(state, env, line_id, quantity)
            },

            CartAction::RemoveLine { line_id } => {
                if !state.can_remove(line_id) {
                    tracing::trace!(%line_id, "Ignoring removal");
                    return SmallVec::new();
                }
                state.pending.insert(line_id);

                let api = Arc::clone(&env.api);
                let session = state.session;
                smallvec![request_effect! {
                    call: api.delete_cart_line(line_id),
                    on_success: |()| Some(CartAction::LineRemoved { session, line_id }),
                    on_error: |error| Some(CartAction::RemoveLineFailed { session, line_id, error })
                }]
            },

            CartAction::RequestCheckout => {
                if state.can_checkout() {
                    state.checkout = CheckoutState::AwaitingConfirmation;
                } else {
                    tracing::trace!("Checkout not available");
                }
                SmallVec::new()
            },

            CartAction::CancelCheckout => {
                if state.checkout == CheckoutState::AwaitingConfirmation {
                    state.checkout = CheckoutState::Idle;
                }
                SmallVec::new()
            },

            CartAction::ConfirmCheckout => {
                if state.checkout != CheckoutState::AwaitingConfirmation {
                    tracing::trace!("Nothing to confirm");
                    return SmallVec::new();
                }

                let order = OrderRequest::from_lines(env.user_id, &state.lines, env.clock.now());
                if let Err(error) = order.validate() {
                    // Reported through OrderFailed so observers see an answer
                    state.checkout = CheckoutState::Idle;
                    let session = state.session;
                    return smallvec![async_effect! {
                        Some(CartAction::OrderFailed { session, error })
                    }];
                }

                tracing::info!(items = order.items.len(), total = %order.total_price, "Placing order");
                state.checkout = CheckoutState::Placing {
                    order: order.clone(),
                };

                let api = Arc::clone(&env.api);
                let session = state.session;
                smallvec![request_effect! {
                    call: api.place_order(order),
                    on_success: |receipt| Some(CartAction::OrderPlaced { session, receipt }),
                    on_error: |error| Some(CartAction::OrderFailed { session, error })
                }]
            },

            CartAction::Detach => {
                state.session = state.session.next();
                state.pending.clear();
                state.adds_in_flight = 0;
                if state.checkout.is_in_progress() {
                    state.checkout = CheckoutState::Idle;
                }
                SmallVec::new()
            },

            CartAction::DismissNotification { id } => {
                state.notifications.dismiss(id);
                SmallVec::new()
            },

            // ========== Events ==========
            CartAction::CartLoaded { lines, .. } => {
                tracing::debug!(count = lines.len(), "Cart loaded");
                Self::replace_lines(state, lines);
                state.phase = Phase::Ready;
                SmallVec::new()
            },

            CartAction::CartLoadFailed { error, .. } => {
                Self::replace_lines(state, Vec::new());
                state.phase = Phase::Ready;
                smallvec![Self::notify_failure(state, env, LOAD_FAILED_MESSAGE, &error)]
            },

            CartAction::LineAdded { line, .. } => {
                state.adds_in_flight = state.adds_in_flight.saturating_sub(1);

                let mut lines = state.lines.to_vec();
                match lines.iter_mut().find(|l| l.id == line.id) {
                    Some(existing) => *existing = line,
                    None => lines.push(line),
                }
                Self::replace_lines(state, lines);

                smallvec![Self::notify(state, env, Level::Success, ADD_SUCCESS_MESSAGE, None)]
            },

            CartAction::AddLineFailed { error, .. } => {
                state.adds_in_flight = state.adds_in_flight.saturating_sub(1);
                smallvec![Self::notify_failure(state, env, ADD_FAILED_MESSAGE, &error)]
            },

            CartAction::QuantityChanged {
                line_id, quantity, ..
            } => {
                state.pending.remove(&line_id);

                let lines = state
                    .lines
                    .iter()
                    .map(|l| {
                        if l.id == line_id {
                            CartLine {
                                quantity,
                                ..l.clone()
                            }
                        } else {
                            l.clone()
                        }
                    })
                    .collect();
                Self::replace_lines(state, lines);
                SmallVec::new()
            },

            CartAction::QuantityChangeFailed { line_id, error, .. } => {
                state.pending.remove(&line_id);
                smallvec![Self::notify_failure(state, env, QUANTITY_FAILED_MESSAGE, &error)]
            },

            CartAction::LineRemoved { line_id, .. } => {
                state.pending.remove(&line_id);

                let lines = state.lines.iter().filter(|l| l.id != line_id).cloned().collect();
                Self::replace_lines(state, lines);
                SmallVec::new()
            },

            CartAction::RemoveLineFailed { line_id, error, .. } => {
                state.pending.remove(&line_id);
                smallvec![Self::notify_failure(state, env, REMOVE_FAILED_MESSAGE, &error)]
            },

            CartAction::OrderPlaced { session, receipt } => {
                let CheckoutState::Placing { order } = std::mem::take(&mut state.checkout) else {
                    tracing::debug!("Order confirmation without an order in flight");
                    return SmallVec::new();
                };

                tracing::info!(order_id = ?receipt.order_id, "Order placed");
                Self::replace_lines(state, Vec::new());
                state.pending.clear();

                let mut effects: SmallVec<[Effect<CartAction>; 4]> = smallvec![Self::notify(
                    state,
                    env,
                    Level::Success,
                    ORDER_PLACED_MESSAGE,
                    None,
                )];
                if env.stock_policy == StockPolicy::ClientDecrement {
                    effects.push(sync_stock(Arc::clone(&env.api), session, &order));
                }

                state.checkout = CheckoutState::Placed { order, receipt };
                effects
            },

            CartAction::OrderFailed { error, .. } => {
                if matches!(state.checkout, CheckoutState::Placing { .. }) {
                    state.checkout = CheckoutState::Idle;
                }
                smallvec![Self::notify_failure(state, env, ORDER_FAILED_MESSAGE, &error)]
            },

            CartAction::StockSynced {
                updated, failed, ..
            } => {
                tracing::debug!(updated = updated.len(), failed = failed.len(), "Stock synced");
                if failed.is_empty() {
                    return SmallVec::new();
                }
                smallvec![Self::notify(
                    state,
                    env,
                    Level::Warning,
                    format!("Failed to update stock for {} product(s).", failed.len()),
                    Some(FailureCategory::Network),
                )]
            },
        }
    }
}
