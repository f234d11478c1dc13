//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for the request/response effects that every storefront transition issues.

/// Create an `Effect::Future` that awaits a fallible call and maps the result
///
/// The call expression is evaluated inside an `async move` block, so any
/// handles it uses (an `Arc<dyn StorefrontApi>`, say) must be cloned into
/// locals before the macro.
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::request_effect;
///
/// let api = Arc::clone(&env.api);
/// request_effect! {
///     call: api.read_cart(),
///     on_success: |lines| Some(CartAction::CartLoaded { session, lines }),
///     on_error: |error| Some(CartAction::CartLoadFailed { session, error })
/// }
/// ```
#[macro_export]
macro_rules! request_effect {
    (
        call: $call:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $call.await {
                ::std::result::Result::Ok($success_param) => $success_body,
                ::std::result::Result::Err($error_param) => $error_body,
            }
        }))
    };
}

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::async_effect;
///
/// async_effect! {
///     let products = api.list_products().await.ok()?;
///     Some(CatalogAction::ProductsLoaded { session, products })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(6),
///     action: CartAction::DismissNotification { id }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded { value: i32 },
        Failed { error: String },
        Dismiss,
    }

    async fn fetch(ok: bool) -> Result<i32, String> {
        if ok { Ok(42) } else { Err("offline".to_string()) }
    }

    async fn run(effect: Effect<TestAction>) -> Option<TestAction> {
        match effect {
            Effect::Future(fut) => fut.await,
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_request_effect_maps_success() {
        let effect = request_effect! {
            call: fetch(true),
            on_success: |value| Some(TestAction::Loaded { value }),
            on_error: |error| Some(TestAction::Failed { error })
        };

        assert_eq!(run(effect).await, Some(TestAction::Loaded { value: 42 }));
    }

    #[tokio::test]
    async fn test_request_effect_maps_error() {
        let effect = request_effect! {
            call: fetch(false),
            on_success: |value| Some(TestAction::Loaded { value }),
            on_error: |error| Some(TestAction::Failed { error })
        };

        assert_eq!(
            run(effect).await,
            Some(TestAction::Failed {
                error: "offline".to_string()
            })
        );
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 1 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(6),
            action: TestAction::Dismiss
        };

        assert!(matches!(effect, Effect::Delay { .. }));
    }
}
