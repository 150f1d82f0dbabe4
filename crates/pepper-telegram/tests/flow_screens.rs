// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow replies as they would appear in the chat.

use std::sync::Arc;

use chrono::NaiveDate;
use teloxide::types::InlineKeyboardButtonKind;

use pepper_chat::{FlowEngine, TextOutcome};
use pepper_core::Actor;
use pepper_telegram::callback;
use pepper_telegram::screens::{Screen, screen};
use pepper_test_utils::memory_inventory;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn buttons(screen: &Screen) -> Vec<(String, String)> {
    screen
        .keyboard
        .iter()
        .flat_map(|k| k.inline_keyboard.iter().flatten())
        .filter_map(|b| match &b.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some((b.text.clone(), data.clone())),
            _ => None,
        })
        .collect()
}

/// Presses the button labelled `label` on `screen`.
async fn press(flow: &FlowEngine, actor: &Actor, screen: &Screen, label: &str) -> Screen {
    let (_, data) = buttons(screen)
        .into_iter()
        .find(|(text, _)| text == label)
        .unwrap_or_else(|| panic!("no button {label}"));
    let action = callback::decode(&data).expect("own callback data");
    let reply = flow.handle_action(actor, action).await.unwrap();
    self::screen(&reply, today())
}

async fn send(flow: &FlowEngine, actor: &Actor, text: &str) -> Screen {
    match flow.handle_text(actor, text).await.unwrap() {
        TextOutcome::Reply(reply) => screen(&reply, today()),
        TextOutcome::Chat { .. } => panic!("text went to the assistant"),
    }
}

#[tokio::test]
async fn create_fill_and_list_a_fridge() {
    let flow = FlowEngine::new(Arc::new(memory_inventory().await));
    let actor = Actor::new("7", "anna");

    let list = screen(
        &flow
            .handle_action(&actor, pepper_chat::Action::ShowFridges)
            .await
            .unwrap(),
        today(),
    );
    assert_eq!(
        buttons(&list).into_iter().map(|(t, _)| t).collect::<Vec<_>>(),
        vec!["➕ Новый холодильник", "➖ Удалить холодильник"]
    );

    let prompt = press(&flow, &actor, &list, "➕ Новый холодильник").await;
    assert_eq!(prompt.text, "✍️ Введи название нового холодильника:");
    let created = send(&flow, &actor, "Кухня").await;
    assert_eq!(created.text, "🆕 Холодильник «Кухня» создан");

    press(&flow, &actor, &created, "➕ Добавить продукт").await;
    send(&flow, &actor, "Молоко").await;
    send(&flow, &actor, "2").await;
    send(&flow, &actor, "л").await;
    let added = send(&flow, &actor, "2026-03-12").await;
    assert_eq!(added.text, "Молоко добавлен в холодильник «Кухня».");

    let products = press(&flow, &actor, &created, "📦 Показать продукты").await;
    assert_eq!(
        products.text,
        "📦 Продукты:\nМолоко — 2 л ⚠️ до конца срока 2 дн. (до 2026-03-12)"
    );

    let list = screen(
        &flow
            .handle_action(&actor, pepper_chat::Action::ShowFridges)
            .await
            .unwrap(),
        today(),
    );
    let selected = press(&flow, &actor, &list, "🧊 Кухня").await;
    assert!(selected.text.starts_with("📦 Продукты холодильника Кухня:\nМолоко"));
}

#[tokio::test]
async fn delete_menu_and_refusal() {
    let store = Arc::new(memory_inventory().await);
    let flow = FlowEngine::new(store);
    let anna = Actor::new("7", "anna");

    let empty = screen(
        &flow
            .handle_action(&anna, pepper_chat::Action::DeleteMenu)
            .await
            .unwrap(),
        today(),
    );
    assert_eq!(empty.text, "❌ У тебя нет холодильников для удаления");

    flow.handle_action(&anna, pepper_chat::Action::NewFridge)
        .await
        .unwrap();
    send(&flow, &anna, "Дача").await;
    let menu = screen(
        &flow
            .handle_action(&anna, pepper_chat::Action::DeleteMenu)
            .await
            .unwrap(),
        today(),
    );
    let (_, data) = buttons(&menu).remove(0);

    let boris = Actor::new("8", "boris");
    let action = callback::decode(&data).unwrap();
    let refused = screen(&flow.handle_action(&boris, action).await.unwrap(), today());
    assert_eq!(refused.text, "❌ Только владелец может удалить холодильник.");

    let deleted = press(&flow, &anna, &menu, "❌ Дача").await;
    assert_eq!(deleted.text, "❌ Холодильник «Дача» удалён.");
}
