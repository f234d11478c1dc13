//! Property tests for cart totals and quantity guards

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use proptest::test_runner::Config;
use std::sync::Arc;
use storefront::{CartAction, CartReducer, CartState, Session, StorefrontEnvironment};
use storefront_api::{CartLine, CartLineId, Decimal, ProductId};
use storefront_core::reducer::Reducer;
use storefront_testing::{InMemoryStorefront, test_clock};

fn env() -> StorefrontEnvironment {
    StorefrontEnvironment::new(Arc::new(InMemoryStorefront::new()), Arc::new(test_clock()))
}

fn cart_line(id: i64, cents: i64, quantity: u32) -> CartLine {
    CartLine {
        id: CartLineId(id),
        product_id: ProductId(id),
        product_name: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        quantity,
    }
}

fn lines() -> impl Strategy<Value = Vec<CartLine>> {
    prop::collection::vec((0_i64..1_000_000, 1_u32..1_000), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .zip(1_i64..)
            .map(|((cents, quantity), id)| cart_line(id, cents, quantity))
            .collect()
    })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn total_is_sum_of_line_totals_and_stable(lines in lines()) {
        let expected: Decimal = lines.iter().map(CartLine::total).sum();
        let state = CartState::with_lines(lines);

        prop_assert_eq!(state.total(), expected);
        prop_assert_eq!(state.total(), state.total());
    }

    #[test]
    fn confirmed_change_is_reflected_in_total(
        cents in 0_i64..1_000_000,
        from in 1_u32..500,
        to in 1_u32..500,
    ) {
        prop_assume!(from != to);
        let reducer = CartReducer::new();
        let env = env();
        let mut state = CartState::with_lines(vec![cart_line(1, cents, from)]);

        let effects = reducer.reduce(
            &mut state,
            CartAction::ChangeQuantity {
                line_id: CartLineId(1),
                delta: i64::from(to) - i64::from(from),
            },
            &env,
        );
        prop_assert_eq!(effects.len(), 1);
        prop_assert!(state.is_pending(CartLineId(1)));
        prop_assert_eq!(state.line(CartLineId(1)).unwrap().quantity, from);

        reducer.reduce(
            &mut state,
            CartAction::QuantityChanged {
                session: Session::default(),
                line_id: CartLineId(1),
                quantity: to,
            },
            &env,
        );
        prop_assert!(!state.has_pending());
        prop_assert_eq!(state.total(), Decimal::new(cents, 2) * Decimal::from(to));
    }

    #[test]
    fn change_to_zero_or_below_is_rejected(
        cents in 0_i64..1_000_000,
        quantity in 1_u32..500,
        overshoot in 0_i64..1_000,
    ) {
        let reducer = CartReducer::new();
        let env = env();
        let mut state = CartState::with_lines(vec![cart_line(1, cents, quantity)]);
        let before = state.total();

        let effects = reducer.reduce(
            &mut state,
            CartAction::ChangeQuantity {
                line_id: CartLineId(1),
                delta: -i64::from(quantity) - overshoot,
            },
            &env,
        );

        prop_assert!(effects.is_empty());
        prop_assert!(!state.has_pending());
        prop_assert_eq!(state.line(CartLineId(1)).unwrap().quantity, quantity);
        prop_assert_eq!(state.total(), before);
        prop_assert!(state.notifications.is_empty());
    }

    #[test]
    fn set_quantity_below_one_is_rejected(quantity in i64::MIN..1) {
        let reducer = CartReducer::new();
        let mut state = CartState::with_lines(vec![cart_line(1, 1_000, 3)]);

        let effects = reducer.reduce(
            &mut state,
            CartAction::SetQuantity {
                line_id: CartLineId(1),
                quantity,
            },
            &env(),
        );

        prop_assert!(effects.is_empty());
        prop_assert!(!state.has_pending());
    }
}
