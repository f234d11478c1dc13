//! Command execution against the storefront stores
//!
//! Commands the cart would ignore (a disabled control in a graphical view)
//! are refused here with an explanation instead of being sent, so the CLI
//! never waits for an answer that will not come.

use crate::Command;
use crate::config::StorefrontConfig;
use crate::render;
use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::time::Duration;
use storefront::{CartAction, CartState, StockPolicy, Storefront};
use storefront_api::{CartLineId, ProductId};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Run `command`, then print every notification it raised
///
/// # Errors
///
/// Returns an error if the command was refused, the server answered with a
/// failure, or no answer arrived within the configured wait timeout.
pub async fn execute(
    command: Command,
    storefront: &Storefront,
    config: &StorefrontConfig,
) -> Result<()> {
    let result = dispatch(command, storefront, config).await;
    report(storefront).await?;
    result
}

async fn dispatch(
    command: Command,
    storefront: &Storefront,
    config: &StorefrontConfig,
) -> Result<()> {
    let wait = config.wait_timeout;
    match command {
        Command::Products => {
            storefront
                .catalog()
                .state(|s| render::products(&mut io::stdout(), &s.products))
                .await?;
            Ok(())
        },
        Command::Cart => show_cart(storefront).await,
        Command::Add {
            product_id,
            quantity,
        } => add(storefront, ProductId(product_id), quantity, wait).await,
        Command::Inc { line_id } => change(storefront, CartLineId(line_id), 1, wait).await,
        Command::Dec { line_id } => change(storefront, CartLineId(line_id), -1, wait).await,
        Command::Change { line_id, delta } => {
            change(storefront, CartLineId(line_id), delta, wait).await
        },
        Command::Set { line_id, quantity } => {
            set(storefront, CartLineId(line_id), quantity, wait).await
        },
        Command::Remove { line_id } => remove(storefront, CartLineId(line_id), wait).await,
        Command::Checkout { yes } => checkout(storefront, yes, config).await,
    }
}

async fn show_cart(storefront: &Storefront) -> Result<()> {
    storefront
        .cart()
        .state(|s| render::cart(&mut io::stdout(), s))
        .await?;
    Ok(())
}

async fn report(storefront: &Storefront) -> Result<()> {
    let mut out = io::stderr();
    storefront
        .catalog()
        .state(|s| render::notifications(&mut out, s.notifications.iter()))
        .await?;
    storefront
        .cart()
        .state(|s| render::notifications(&mut out, s.notifications.iter()))
        .await?;
    Ok(())
}

/// Turn a failure event into an error
fn outcome(action: CartAction) -> Result<()> {
    match action {
        CartAction::CartLoadFailed { error, .. }
        | CartAction::AddLineFailed { error, .. }
        | CartAction::QuantityChangeFailed { error, .. }
        | CartAction::RemoveLineFailed { error, .. }
        | CartAction::OrderFailed { error, .. } => Err(error.into()),
        _ => Ok(()),
    }
}

/// Why the cart would ignore a change of `line_id` to `target`
fn refusal(state: &CartState, line_id: CartLineId, target: Option<i64>) -> String {
    let Some(line) = state.line(line_id) else {
        return format!("There is no line {line_id} in the cart");
    };
    if state.is_pending(line_id) {
        return format!("Line {line_id} is already being updated");
    }
    if !state.accepts_mutations() {
        return "The cart cannot change during checkout".to_string();
    }
    match target {
        Some(target) if target == i64::from(line.quantity) => {
            format!("Line {line_id} already has quantity {target}")
        },
        Some(target) if target < 1 => {
            "Quantity cannot go below 1; use `remove` to delete the line".to_string()
        },
        _ => format!("Line {line_id} cannot be changed right now"),
    }
}

async fn add(storefront: &Storefront, id: ProductId, quantity: u32, wait: Duration) -> Result<()> {
    let product = storefront
        .product(id)
        .await
        .with_context(|| format!("There is no product {id} in the catalog"))?;

    let cart = storefront.cart();
    let stock = product.quantity_in_stock;
    if !cart.state(|s| s.can_add(&product, quantity)).await {
        // Recorded as a validation notification by the cart
        cart.send(CartAction::AddLine { product, quantity }).await?;
        bail!("Cannot add {quantity} unit(s): {stock} in stock");
    }

    let result = cart
        .send_and_wait_for(
            CartAction::AddLine { product, quantity },
            |a| matches!(a, CartAction::LineAdded { .. } | CartAction::AddLineFailed { .. }),
            wait,
        )
        .await
        .context("No answer to add to cart")?;
    outcome(result)?;
    show_cart(storefront).await
}

async fn change(
    storefront: &Storefront,
    line_id: CartLineId,
    delta: i64,
    wait: Duration,
) -> Result<()> {
    let cart = storefront.cart();
    let refused = cart
        .state(|s| {
            (!s.can_change_quantity(line_id, delta)).then(|| {
                let target = s
                    .line(line_id)
                    .map(|l| i64::from(l.quantity).saturating_add(delta));
                refusal(s, line_id, target)
            })
        })
        .await;
    if let Some(reason) = refused {
        bail!(reason);
    }

    update_quantity(storefront, CartAction::ChangeQuantity { line_id, delta }, wait).await
}

async fn set(
    storefront: &Storefront,
    line_id: CartLineId,
    quantity: i64,
    wait: Duration,
) -> Result<()> {
    let cart = storefront.cart();
    let refused = cart
        .state(|s| {
            (!s.can_set_quantity(line_id, quantity)).then(|| refusal(s, line_id, Some(quantity)))
        })
        .await;
    if let Some(reason) = refused {
        bail!(reason);
    }

    update_quantity(storefront, CartAction::SetQuantity { line_id, quantity }, wait).await
}

async fn update_quantity(
    storefront: &Storefront,
    action: CartAction,
    wait: Duration,
) -> Result<()> {
    let result = storefront
        .cart()
        .send_and_wait_for(
            action,
            |a| {
                matches!(
                    a,
                    CartAction::QuantityChanged { .. } | CartAction::QuantityChangeFailed { .. }
                )
            },
            wait,
        )
        .await
        .context("No answer to the quantity change")?;
    outcome(result)?;
    show_cart(storefront).await
}

async fn remove(storefront: &Storefront, line_id: CartLineId, wait: Duration) -> Result<()> {
    let cart = storefront.cart();
    let refused = cart
        .state(|s| (!s.can_remove(line_id)).then(|| refusal(s, line_id, None)))
        .await;
    if let Some(reason) = refused {
        bail!(reason);
    }

    let result = cart
        .send_and_wait_for(
            CartAction::RemoveLine { line_id },
            |a| matches!(a, CartAction::LineRemoved { .. } | CartAction::RemoveLineFailed { .. }),
            wait,
        )
        .await
        .context("No answer to the removal")?;
    outcome(result)?;
    show_cart(storefront).await
}

async fn checkout(storefront: &Storefront, yes: bool, config: &StorefrontConfig) -> Result<()> {
    let cart = storefront.cart();
    let (allowed, empty) = cart.state(|s| (s.can_checkout(), s.is_empty())).await;
    if empty {
        bail!("Your cart is empty");
    }
    if !allowed {
        bail!("Checkout is not available right now");
    }

    cart.send(CartAction::RequestCheckout).await?;
    cart.state(|s| render::confirmation(&mut io::stdout(), s.lines(), s.total()))
        .await?;

    if !(yes || confirm("Place this order? [y/N] ").await?) {
        cart.send(CartAction::CancelCheckout).await?;
        println!("Order cancelled.");
        return Ok(());
    }

    // Under client-side stock adjustment the order is done once stock is written
    let sync_stock = config.stock_policy == StockPolicy::ClientDecrement;
    let result = cart
        .send_and_wait_for(
            CartAction::ConfirmCheckout,
            move |a| {
                if sync_stock {
                    matches!(a, CartAction::StockSynced { .. } | CartAction::OrderFailed { .. })
                } else {
                    a.is_order_result()
                }
            },
            config.wait_timeout,
        )
        .await
        .context("No answer to the order")?;
    outcome(result)?;

    match cart.state(|s| s.checkout.receipt().and_then(|r| r.order_id)).await {
        Some(order_id) => println!("Order #{order_id} placed."),
        None => println!("Order placed."),
    }
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_api::{ApiError, CartLine, Decimal};

    fn state() -> CartState {
        CartState::with_lines(vec![CartLine {
            id: CartLineId(1),
            product_id: ProductId(10),
            product_name: "Laptop".to_string(),
            price: Decimal::from(100),
            quantity: 1,
        }])
    }

    #[test]
    fn refusal_explains_unknown_line() {
        assert_eq!(refusal(&state(), CartLineId(9), Some(2)), "There is no line 9 in the cart");
    }

    #[test]
    fn refusal_points_to_remove_below_one() {
        assert!(refusal(&state(), CartLineId(1), Some(0)).contains("remove"));
    }

    #[test]
    fn refusal_explains_pending_line() {
        let mut state = state();
        state.pending.insert(CartLineId(1));
        assert!(refusal(&state, CartLineId(1), Some(2)).contains("already being updated"));
    }

    #[test]
    fn failure_events_become_errors() {
        let failed = CartAction::OrderFailed {
            session: storefront::Session::default(),
            error: ApiError::Network("offline".into()),
        };
        assert!(outcome(failed).is_err());
        assert!(outcome(CartAction::Load).is_ok());
    }
}
