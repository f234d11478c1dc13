//! Cart state machine and order placement flow
//!
//! The cart mirrors the server-side cart. Every mutation is sent to the
//! server first and applied locally only once the server confirms it. Lines
//! are held in an `Arc<[CartLine]>` that is replaced wholesale on each
//! transition, so a reader holding a snapshot never sees it change.

pub mod checkout;
pub mod reducer;
pub mod stock;
pub mod types;

pub use checkout::CheckoutState;
pub use reducer::CartReducer;
pub use types::{CartAction, CartState};
