// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text listing of a fridge's products with expiry annotations.
//!
//! Expiry dates are stored as typed, so they are parsed here; a value that
//! is not a `YYYY-MM-DD` date is shown with a warning instead of failing.

use chrono::NaiveDate;
use pepper_core::{Fridge, Product};

/// Shown for a fridge without products.
pub const EMPTY_FRIDGE: &str = "Продуктов пока нет.";

/// Days before expiry at which a product is flagged as running out.
const WARN_DAYS: i64 = 7;

/// One line per product in stored order.
pub fn render_listing(fridge: &Fridge, today: NaiveDate) -> String {
    if fridge.products.is_empty() {
        return EMPTY_FRIDGE.to_string();
    }
    fridge
        .products
        .iter()
        .map(|p| render_product(p, today))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_product(product: &Product, today: NaiveDate) -> String {
    let line = format!("{} — {} {}", product.name, product.quantity, product.unit);
    let line = line.trim();
    match product.expires.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => format!("{line} {}", expiry_note(raw, today)),
        None => line.to_string(),
    }
}

fn expiry_note(raw: &str, today: NaiveDate) -> String {
    let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") else {
        return format!("(дата некорректна: {raw})");
    };
    match (date - today).num_days() {
        days if days < 0 => format!("⛔️ срок вышел ({raw})"),
        0 => format!("⚠️ последний день (до {raw})"),
        days if days < WARN_DAYS => format!("⚠️ до конца срока {days} дн. (до {raw})"),
        _ => format!("(годен до {raw})"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pepper_core::{FridgeId, ProductId};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn product(name: &str, expires: Option<&str>) -> Product {
        Product {
            id: ProductId(1),
            name: name.into(),
            quantity: 2,
            unit: "л".into(),
            expires: expires.map(String::from),
        }
    }

    #[test]
    fn empty_fridge() {
        let fridge = Fridge {
            id: FridgeId(1),
            name: "Дом".into(),
            owners: BTreeSet::new(),
            products: vec![],
            next_product_id: 1,
        };
        assert_eq!(render_listing(&fridge, today()), EMPTY_FRIDGE);
    }

    #[test]
    fn annotations_relative_to_today() {
        let cases = [
            (None, "молоко — 2 л"),
            (Some("2026-03-01"), "молоко — 2 л ⛔️ срок вышел (2026-03-01)"),
            (Some("2026-03-10"), "молоко — 2 л ⚠️ последний день (до 2026-03-10)"),
            (Some("2026-03-13"), "молоко — 2 л ⚠️ до конца срока 3 дн. (до 2026-03-13)"),
            (Some("2026-03-17"), "молоко — 2 л (годен до 2026-03-17)"),
            (Some("завтра"), "молоко — 2 л (дата некорректна: завтра)"),
        ];
        for (expires, expected) in cases {
            assert_eq!(render_product(&product("молоко", expires), today()), expected);
        }
    }

    #[test]
    fn empty_unit_leaves_no_trailing_space() {
        let mut p = product("соль", None);
        p.unit = String::new();
        assert_eq!(render_product(&p, today()), "соль — 2");
    }
}
