// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Texts and keyboards shown for each flow reply.

use chrono::NaiveDate;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use pepper_chat::{Action, FlowReply, render_listing};
use pepper_core::{FridgeId, FridgeSummary};

use crate::callback;

pub const GREETING: &str = "👋 Привет! Это твой Promt-Pepper.\n\
Я Шеф-ассистент для создания подходящих рецептов на основе ваших предпочтений и содержимого холодильника.\n\
Выбирай холодильник и управляй продуктами. А если вдруг не знаешь, что приготовить, я помогу с рецептами!\n\
Чтобы начать, нажми на кнопку /myfridges чтобы просмотреть твои холодильники.";

pub const HELP: &str = "❓ Доступные команды:\n\
/myfridges — показать твои холодильники\n\
/help — помощь\n\
/clear — очистить историю диалога с нейросетью\n\
/cancel — прервать ввод холодильника или продукта\n\
Чтобы задать вопрос шеф-ассистенту, просто напиши его в чат после выбора холодильника.";

pub const THINKING: &str = "⏳ Думаю...";

pub const INTERNAL_ERROR: &str = "Произошла ошибка, попробуйте повторить запрос";

/// Message text plus an optional inline keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Screen {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

fn button(label: impl Into<String>, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, callback::encode(action))
}

pub fn fridge_list_keyboard(fridges: &[FridgeSummary]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = fridges
        .iter()
        .map(|f| vec![button(format!("🧊 {}", f.name), Action::SelectFridge(f.id))])
        .collect();
    rows.push(vec![button("➕ Новый холодильник", Action::NewFridge)]);
    rows.push(vec![button("➖ Удалить холодильник", Action::DeleteMenu)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn fridge_actions_keyboard(id: FridgeId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        [button("➕ Добавить продукт", Action::AddProduct(id))],
        [button("➖ Удалить продукт", Action::RemoveProduct(id))],
        [button("📦 Показать продукты", Action::ListProducts(id))],
    ])
}

pub fn delete_keyboard(fridges: &[FridgeSummary]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        fridges
            .iter()
            .map(|f| [button(format!("❌ {}", f.name), Action::ConfirmDelete(f.id))]),
    )
}

/// Persistent keyboard offered by `/start`.
pub fn start_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new([[KeyboardButton::new("/myfridges"), KeyboardButton::new("/help")]])
        .resize_keyboard()
}

/// Refusals that answer a button press as a popup instead of a message.
pub fn is_alert(reply: &FlowReply) -> bool {
    matches!(reply, FlowReply::NotOwner)
}

pub fn screen(reply: &FlowReply, today: NaiveDate) -> Screen {
    match reply {
        FlowReply::FridgeList { fridges } => {
            Screen::with_keyboard("📋 Твои холодильники:", fridge_list_keyboard(fridges))
        }
        FlowReply::FridgeSelected { fridge } => Screen::with_keyboard(
            format!(
                "📦 Продукты холодильника {}:\n{}\n\nВыбери действие:",
                fridge.name,
                render_listing(fridge, today)
            ),
            fridge_actions_keyboard(fridge.id),
        ),
        FlowReply::Products { fridge } => {
            Screen::text(format!("📦 Продукты:\n{}", render_listing(fridge, today)))
        }
        FlowReply::AskFridgeName => Screen::text("✍️ Введи название нового холодильника:"),
        FlowReply::FridgeCreated { fridge } => Screen::with_keyboard(
            format!("🆕 Холодильник «{}» создан", fridge.name),
            fridge_actions_keyboard(fridge.id),
        ),
        FlowReply::DeleteMenu { fridges } => {
            Screen::with_keyboard("Выбери холодильник для удаления:", delete_keyboard(fridges))
        }
        FlowReply::NothingToDelete => Screen::text("❌ У тебя нет холодильников для удаления"),
        FlowReply::FridgeDeleted { name } => {
            Screen::text(format!("❌ Холодильник «{name}» удалён."))
        }
        FlowReply::OnlyOwnerCanDelete => {
            Screen::text("❌ Только владелец может удалить холодильник.")
        }
        FlowReply::AskProductName => Screen::text("✍️ Введи название продукта:"),
        FlowReply::AskQuantity => Screen::text("✍️ Введи количество:"),
        FlowReply::AskRemoveQuantity => Screen::text("✍️ Введи количество для удаления:"),
        FlowReply::AskUnit => Screen::text(
            "✍️ Введи единицу измерения (шт, кг, л...) или «-», чтобы оставить пустым:",
        ),
        FlowReply::AskExpiry => Screen::text(
            "✍️ Введи срок годности (YYYY-MM-DD) или «-», чтобы оставить пустым:",
        ),
        FlowReply::NeedNumber => Screen::text("❗ Нужно число."),
        FlowReply::ProductAdded(outcome) => Screen::text(outcome.to_string()),
        FlowReply::ProductRemoved(outcome) => Screen::text(outcome.to_string()),
        FlowReply::NotOwner => Screen::text("❌ Вы не админ этого холодильника"),
        FlowReply::FridgeNotFound { id } => Screen::text(format!("❌ Холодильник {id} не найден.")),
        FlowReply::Cancelled => Screen::text("↩️ Ввод отменён."),
        FlowReply::NothingToCancel => Screen::text("Нечего отменять."),
        FlowReply::ConversationCleared => Screen::text("История диалога очищена."),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pepper_core::{AddOutcome, Fridge, OwnerId, Product, ProductId};
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_fridge_list_offers_only_new_and_delete() {
        let screen = screen(&FlowReply::FridgeList { fridges: vec![] }, today());
        assert_eq!(screen.text, "📋 Твои холодильники:");
        assert_eq!(
            callback_data(&screen.keyboard.unwrap()),
            vec!["new_fridge", "delete_fridge"]
        );
    }

    #[test]
    fn fridge_list_puts_fridges_first() {
        let fridges = vec![FridgeSummary {
            id: FridgeId(3),
            name: "Дача".into(),
        }];
        let screen = screen(&FlowReply::FridgeList { fridges }, today());
        let keyboard = screen.keyboard.unwrap();
        assert_eq!(keyboard.inline_keyboard[0][0].text, "🧊 Дача");
        assert_eq!(callback_data(&keyboard)[0], "fridge:3");
    }

    #[test]
    fn selected_fridge_lists_products_with_actions() {
        let fridge = Fridge {
            id: FridgeId(1),
            name: "Кухня".into(),
            owners: BTreeSet::from([OwnerId("anna".into())]),
            products: vec![Product {
                id: ProductId(1),
                name: "молоко".into(),
                quantity: 2,
                unit: "л".into(),
                expires: Some("2026-03-10".into()),
            }],
            next_product_id: 2,
        };
        let screen = screen(&FlowReply::FridgeSelected { fridge }, today());
        assert_eq!(
            screen.text,
            "📦 Продукты холодильника Кухня:\nмолоко — 2 л ⚠️ последний день (до 2026-03-10)\n\nВыбери действие:"
        );
        assert_eq!(
            callback_data(&screen.keyboard.unwrap()),
            vec!["action:add:1", "action:remove:1", "action:list:1"]
        );
    }

    #[test]
    fn outcomes_use_their_summary() {
        let reply = FlowReply::ProductAdded(AddOutcome::Created {
            name: "сыр".into(),
            fridge: "Кухня".into(),
        });
        assert_eq!(
            screen(&reply, today()).text,
            "сыр добавлен в холодильник «Кухня»."
        );
    }

    #[test]
    fn only_not_owner_is_an_alert() {
        assert!(is_alert(&FlowReply::NotOwner));
        assert!(!is_alert(&FlowReply::OnlyOwnerCanDelete));
        assert_eq!(
            screen(&FlowReply::FridgeNotFound { id: FridgeId(9) }, today()).text,
            "❌ Холодильник 9 не найден."
        );
    }
}
