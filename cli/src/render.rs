//! Plain-text tables for the terminal

use std::io::{self, Write};
use storefront::{CartState, Level, Notification};
use storefront_api::{CartLine, Decimal, Product};

/// Product grid: id, name, price, stock
pub fn products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products available.");
    }

    writeln!(out, "{:>6}  {:<32} {:>10} {:>8}", "ID", "NAME", "PRICE", "STOCK")?;
    for product in products {
        writeln!(
            out,
            "{:>6}  {:<32} {:>10} {:>8}",
            product.id,
            truncate(&product.name, 32),
            money(product.price),
            product.quantity_in_stock
        )?;
    }
    Ok(())
}

/// Cart grid with line ids, followed by the total
pub fn cart(out: &mut impl Write, state: &CartState) -> io::Result<()> {
    if state.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    writeln!(
        out,
        "{:>6}  {:<32} {:>5} {:>10} {:>12}",
        "LINE", "PRODUCT", "QTY", "PRICE", "TOTAL"
    )?;
    for line in state.lines() {
        writeln!(
            out,
            "{:>6}  {:<32} {:>5} {:>10} {:>12}",
            line.id,
            truncate(&line.product_name, 32),
            line.quantity,
            money(line.price),
            money(line.total())
        )?;
    }
    writeln!(out, "{:>70}", format!("Total: {}", money(state.total())))
}

/// Order confirmation: name, quantity, unit price, line total, grand total
pub fn confirmation(out: &mut impl Write, lines: &[CartLine], total: Decimal) -> io::Result<()> {
    writeln!(out, "Please confirm your order:")?;
    writeln!(
        out,
        "  {:<32} {:>5} {:>10} {:>12}",
        "PRODUCT", "QTY", "PRICE", "TOTAL"
    )?;
    for line in lines {
        writeln!(
            out,
            "  {:<32} {:>5} {:>10} {:>12}",
            truncate(&line.product_name, 32),
            line.quantity,
            money(line.price),
            money(line.total())
        )?;
    }
    writeln!(out, "  Grand total: {}", money(total))
}

/// One line per notification, oldest first
pub fn notifications<'a>(
    out: &mut impl Write,
    notifications: impl IntoIterator<Item = &'a Notification>,
) -> io::Result<()> {
    for notification in notifications {
        let level = match notification.level {
            Level::Success => "ok",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        match notification.category {
            Some(category) => {
                writeln!(out, "[{level}] {} ({category})", notification.message)?;
            },
            None => writeln!(out, "[{level}] {}", notification.message)?,
        }
    }
    Ok(())
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use storefront_core::{DateTime, Utc};
    use storefront::NotificationId;
    use storefront_api::{CartLineId, FailureCategory, ProductId};

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn line(id: i64, name: &str, price: Decimal, quantity: u32) -> CartLine {
        CartLine {
            id: CartLineId(id),
            product_id: ProductId(id),
            product_name: name.to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn cart_lists_lines_and_total() {
        let state = CartState::with_lines(vec![
            line(1, "Laptop", Decimal::from(100), 2),
            line(2, "Mouse", Decimal::new(4999, 2), 1),
        ]);

        let text = rendered(|out| cart(out, &state));

        assert!(text.contains("Laptop"));
        assert!(text.contains("200.00"));
        assert!(text.contains("49.99"));
        assert!(text.trim_end().ends_with("Total: 249.99"));
    }

    #[test]
    fn empty_cart_says_so() {
        let text = rendered(|out| cart(out, &CartState::with_lines(Vec::new())));
        assert_eq!(text, "Your cart is empty.\n");
    }

    #[test]
    fn confirmation_ends_with_grand_total() {
        let lines = vec![line(1, "Laptop", Decimal::from(100), 3)];

        let text = rendered(|out| confirmation(out, &lines, Decimal::from(300)));

        assert!(text.starts_with("Please confirm your order:"));
        assert!(text.contains("300.00"));
        assert!(text.trim_end().ends_with("Grand total: 300.00"));
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "x".repeat(40);
        assert_eq!(truncate(&name, 32).chars().count(), 32);
        assert_eq!(truncate("short", 32), "short");
    }

    #[test]
    fn notifications_show_level_and_category() {
        let notification = Notification {
            id: NotificationId(0),
            level: Level::Error,
            message: "Failed to fetch products".to_string(),
            category: Some(FailureCategory::Network),
            at: DateTime::<Utc>::UNIX_EPOCH,
        };

        let text = rendered(|out| notifications(out, [&notification]));

        assert_eq!(text, "[error] Failed to fetch products (network)\n");
    }
}
