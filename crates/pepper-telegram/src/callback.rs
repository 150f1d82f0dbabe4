// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline button payloads.
//!
//! Telegram hands back the `callback_data` string of the pressed button;
//! these functions map it to and from a flow [`Action`].

use pepper_chat::Action;
use pepper_core::FridgeId;

pub fn encode(action: Action) -> String {
    match action {
        Action::ShowFridges => "fridges".to_string(),
        Action::SelectFridge(id) => format!("fridge:{id}"),
        Action::NewFridge => "new_fridge".to_string(),
        Action::DeleteMenu => "delete_fridge".to_string(),
        Action::ConfirmDelete(id) => format!("removefridge:{id}"),
        Action::AddProduct(id) => format!("action:add:{id}"),
        Action::RemoveProduct(id) => format!("action:remove:{id}"),
        Action::ListProducts(id) => format!("action:list:{id}"),
        Action::Cancel => "cancel".to_string(),
    }
}

/// Parses button data; `None` for anything this bot did not produce.
pub fn decode(data: &str) -> Option<Action> {
    let action = match data {
        "fridges" => Action::ShowFridges,
        "new_fridge" => Action::NewFridge,
        "delete_fridge" => Action::DeleteMenu,
        "cancel" => Action::Cancel,
        _ => {
            let (kind, id) = data.rsplit_once(':')?;
            let id = FridgeId(id.parse().ok()?);
            match kind {
                "fridge" => Action::SelectFridge(id),
                "removefridge" => Action::ConfirmDelete(id),
                "action:add" => Action::AddProduct(id),
                "action:remove" => Action::RemoveProduct(id),
                "action:list" => Action::ListProducts(id),
                _ => return None,
            }
        }
    };
    Some(action)
}
