// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite inventory store.

use pepper_config::model::StorageConfig;
use pepper_core::{
    AddOutcome, DeleteOutcome, FridgeId, InventoryStore, NewProduct, OwnerId, PluginAdapter,
    RemoveOutcome, Role, UserId,
};
use pepper_storage::SqliteInventory;
use tempfile::tempdir;

fn alice() -> OwnerId {
    OwnerId("alice".into())
}

fn product(name: &str, quantity: u32, unit: &str, expires: Option<&str>) -> NewProduct {
    NewProduct {
        name: name.into(),
        quantity,
        unit: unit.into(),
        expires: expires.map(String::from),
    }
}

#[tokio::test]
async fn created_fridges_are_listed_for_their_owner_only() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let home = store.create_fridge("Дом", &alice()).await.unwrap();
    let dacha = store.create_fridge("Дача", &alice()).await.unwrap();
    store.create_fridge("Офис", &OwnerId("bob".into())).await.unwrap();

    assert_ne!(home.id, dacha.id);
    let owned: Vec<String> = store
        .list_owned(&alice())
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(owned, vec!["Дом", "Дача"]);
}

#[tokio::test]
async fn fridge_ids_are_not_reused_after_delete() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let first = store.create_fridge("A", &alice()).await.unwrap();
    store.delete_fridge(first.id, &alice()).await.unwrap();
    let second = store.create_fridge("B", &alice()).await.unwrap();
    assert!(second.id.0 > first.id.0);
}

#[tokio::test]
async fn add_merges_and_remove_decrements_then_deletes() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let fridge = store.create_fridge("Дом", &alice()).await.unwrap();

    let created = store
        .add_product(fridge.id, product("Молоко", 2, "л", Some("2026-03-01")))
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(created, AddOutcome::Created { .. }));

    let merged = store
        .add_product(fridge.id, product("молоко", 1, "л", None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        merged.to_string(),
        "Добавлено 1 л к Молоко. Теперь всего: 3 л."
    );

    let stored = store.get_fridge(fridge.id).await.unwrap().unwrap();
    assert_eq!(stored.products.len(), 1);
    assert_eq!(stored.products[0].quantity, 3);
    assert_eq!(stored.products[0].expires.as_deref(), Some("2026-03-01"));

    let decremented = store
        .remove_product(fridge.id, "МОЛОКО", 2)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        decremented,
        RemoveOutcome::Decremented { remaining: 1, .. }
    ));

    let deleted = store
        .remove_product(fridge.id, "молоко", 10)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(deleted, RemoveOutcome::Deleted { .. }));
    let stored = store.get_fridge(fridge.id).await.unwrap().unwrap();
    assert!(stored.products.is_empty());
}

#[tokio::test]
async fn product_ids_survive_deletes_and_reopen() {
    let dir = tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("pepper.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };

    let fridge_id = {
        let store = SqliteInventory::open(&config).await.unwrap();
        let fridge = store.create_fridge("Дом", &alice()).await.unwrap();
        store.add_product(fridge.id, product("a", 1, "шт", None)).await.unwrap();
        store.add_product(fridge.id, product("b", 1, "шт", None)).await.unwrap();
        store.remove_product(fridge.id, "b", 1).await.unwrap();
        store.shutdown().await.unwrap();
        fridge.id
    };

    let store = SqliteInventory::open(&config).await.unwrap();
    store.add_product(fridge_id, product("c", 1, "шт", None)).await.unwrap();
    let fridge = store.get_fridge(fridge_id).await.unwrap().unwrap();
    let ids: Vec<i64> = fridge.products.iter().map(|p| p.id.0).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn delete_requires_ownership() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let fridge = store.create_fridge("Дом", &alice()).await.unwrap();

    let outcome = store
        .delete_fridge(fridge.id, &OwnerId("mallory".into()))
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Unauthorized);
    assert!(store.get_fridge(fridge.id).await.unwrap().is_some());

    let outcome = store.delete_fridge(fridge.id, &alice()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { name: "Дом".into() });
    assert!(store.get_fridge(fridge.id).await.unwrap().is_none());

    let outcome = store.delete_fridge(FridgeId(12345), &alice()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn conversation_keeps_order_and_clears_per_user() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let user = UserId("42".into());
    let other = UserId("7".into());

    for turn in 0..3 {
        store
            .append_conversation(&user, Role::User, &format!("q{turn}"))
            .await
            .unwrap();
        store
            .append_conversation(&user, Role::Assistant, &format!("a{turn}"))
            .await
            .unwrap();
    }
    store.append_conversation(&other, Role::User, "hi").await.unwrap();

    let log = store.get_conversation(&user).await.unwrap();
    assert_eq!(log.len(), 6);
    assert_eq!(log[0].role, Role::User);
    assert_eq!(log[0].content, "q0");
    assert_eq!(log[5].role, Role::Assistant);
    assert_eq!(log[5].content, "a2");

    store.clear_conversation(&user).await.unwrap();
    assert!(store.get_conversation(&user).await.unwrap().is_empty());
    assert_eq!(store.get_conversation(&other).await.unwrap().len(), 1);
}

#[tokio::test]
async fn system_role_is_not_persisted() {
    let store = SqliteInventory::open_in_memory().await.unwrap();
    let result = store
        .append_conversation(&UserId("1".into()), Role::System, "prompt")
        .await;
    assert!(result.is_err());
}
