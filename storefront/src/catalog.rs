//! Catalog state machine: the product list
//!
//! Products are read-only for the client. The catalog loads them once per
//! view and keeps the last good list until the next load.

use crate::environment::StorefrontEnvironment;
use crate::notification::{Level, NotificationId, Notifications, notify};
use crate::session::{Phase, Session};
use std::sync::Arc;
use storefront_api::{ApiError, Product, ProductId};
use storefront_core::{SmallVec, effect::Effect, reducer::Reducer, request_effect, smallvec};

/// Shown when the product list cannot be read
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch products";

/// Client view of the product catalog
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    /// Loading phase
    pub phase: Phase,
    /// Products in server order
    pub products: Arc<[Product]>,
    /// Active view instance
    pub session: Session,
    /// Pending user notifications
    pub notifications: Notifications,
}

impl CatalogState {
    /// Creates a new, not yet loaded `CatalogState`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a product by id
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns `true` once the last load finished
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Number of products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns `true` if there are no products
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Actions for the catalog
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogAction {
    // Commands
    /// Read the product list
    Load,
    /// The view went away; ignore answers to requests it issued
    Detach,
    /// Remove a notification
    DismissNotification {
        /// Notification to remove
        id: NotificationId,
    },

    // Events
    /// Product list arrived
    ProductsLoaded {
        /// Session the load was issued for
        session: Session,
        /// Products in server order
        products: Vec<Product>,
    },
    /// Product list could not be read
    LoadFailed {
        /// Session the load was issued for
        session: Session,
        /// What went wrong
        error: ApiError,
    },
}

impl CatalogAction {
    /// Returns `true` for the answers to [`CatalogAction::Load`]
    #[must_use]
    pub const fn is_load_result(&self) -> bool {
        matches!(self, Self::ProductsLoaded { .. } | Self::LoadFailed { .. })
    }
}

/// Reducer for the catalog
#[derive(Clone, Debug)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CatalogReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = StorefrontEnvironment;

    fn accepts(&self, state: &Self::State, action: &Self::Action) -> bool {
        match action {
            CatalogAction::ProductsLoaded { session, .. }
            | CatalogAction::LoadFailed { session, .. } => *session == state.session,
            _ => true,
        }
    }

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if !self.accepts(state, &action) {
            tracing::debug!(current = %state.session, "Ignoring catalog result for a detached view");
            return SmallVec::new();
        }

        match action {
            CatalogAction::Load => {
                state.phase = Phase::Loading;

                let api = Arc::clone(&env.api);
                let session = state.session;
                smallvec![request_effect! {
                    call: api.list_products(),
                    on_success: |products| Some(CatalogAction::ProductsLoaded { session, products }),
                    on_error: |error| Some(CatalogAction::LoadFailed { session, error })
                }]
            },

            CatalogAction::Detach => {
                state.session = state.session.next();
                SmallVec::new()
            },

            CatalogAction::DismissNotification { id } => {
                state.notifications.dismiss(id);
                SmallVec::new()
            },

            CatalogAction::ProductsLoaded { products, .. } => {
                tracing::debug!(count = products.len(), "Catalog loaded");
                state.products = products.into();
                state.phase = Phase::Ready;
                SmallVec::new()
            },

            CatalogAction::LoadFailed { error, .. } => {
                tracing::warn!(%error, "Failed to load catalog");
                state.products = Vec::new().into();
                state.phase = Phase::Ready;

                let effect = notify(
                    &mut state.notifications,
                    env,
                    Level::Error,
                    LOAD_FAILED_MESSAGE,
                    Some(error.category()),
                    |id| CatalogAction::DismissNotification { id },
                );
                smallvec![effect]
            },
        }
    }
}
