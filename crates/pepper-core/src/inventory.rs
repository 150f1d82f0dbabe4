// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fridge and product model with the add/remove arithmetic every store shares.
//!
//! Product names match case-insensitively (full Unicode lower-casing), but the
//! stored display name is the one used when the product was first added.
//! Removing at least the quantity on hand deletes the product instead of
//! driving the quantity negative.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FridgeId, OwnerId, ProductId};

/// Unit used when the user leaves the unit empty.
pub const DEFAULT_UNIT: &str = "шт";

/// A product stored in a fridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    /// Expiry date as typed by the user, expected as `YYYY-MM-DD`.
    pub expires: Option<String>,
}

/// Fully collected input of an add-product flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub expires: Option<String>,
}

/// A named, multi-owner container of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fridge {
    pub id: FridgeId,
    pub name: String,
    pub owners: BTreeSet<OwnerId>,
    /// Products in insertion order.
    pub products: Vec<Product>,
    /// Id handed to the next newly created product. Never decreases.
    pub next_product_id: i64,
}

impl Fridge {
    /// Returns true if `owner` may view, mutate or delete this fridge.
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owners.contains(owner)
    }

    /// Finds a product by case-insensitive name.
    pub fn find_product(&self, name: &str) -> Option<&Product> {
        self.position_of(name).map(|i| &self.products[i])
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let key = name.trim().to_lowercase();
        self.products
            .iter()
            .position(|p| p.name.to_lowercase() == key)
    }

    /// Adds a product, merging into an existing entry with the same name.
    ///
    /// A merge accumulates the quantity and overwrites the expiry only when a
    /// new one is supplied; name and unit of the existing entry are kept.
    pub fn add_product(&mut self, new: NewProduct) -> AddOutcome {
        if let Some(pos) = self.position_of(&new.name) {
            let product = &mut self.products[pos];
            product.quantity = product.quantity.saturating_add(new.quantity);
            if new.expires.is_some() {
                product.expires = new.expires;
            }
            return AddOutcome::Merged {
                name: product.name.clone(),
                added: new.quantity,
                unit: product.unit.clone(),
                total: product.quantity,
            };
        }

        let id = ProductId(self.next_product_id);
        self.next_product_id += 1;
        let name = new.name.trim().to_string();
        self.products.push(Product {
            id,
            name: name.clone(),
            quantity: new.quantity,
            unit: new.unit,
            expires: new.expires,
        });
        AddOutcome::Created {
            name,
            fridge: self.name.clone(),
        }
    }

    /// Removes `quantity` of the named product.
    pub fn remove_product(&mut self, name: &str, quantity: u32) -> RemoveOutcome {
        let Some(pos) = self.position_of(name) else {
            return RemoveOutcome::NotFound {
                name: name.trim().to_string(),
            };
        };

        if quantity >= self.products[pos].quantity {
            let removed = self.products.remove(pos);
            return RemoveOutcome::Deleted { name: removed.name };
        }

        let product = &mut self.products[pos];
        product.quantity -= quantity;
        RemoveOutcome::Decremented {
            name: product.name.clone(),
            removed: quantity,
            remaining: product.quantity,
            unit: product.unit.clone(),
        }
    }
}

/// Lightweight fridge reference used in menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FridgeSummary {
    pub id: FridgeId,
    pub name: String,
}

impl From<&Fridge> for FridgeSummary {
    fn from(fridge: &Fridge) -> Self {
        Self {
            id: fridge.id,
            name: fridge.name.clone(),
        }
    }
}

/// Result of adding a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created { name: String, fridge: String },
    Merged {
        name: String,
        added: u32,
        unit: String,
        total: u32,
    },
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { name, fridge } => {
                write!(f, "{name} добавлен в холодильник «{fridge}».")
            }
            Self::Merged {
                name,
                added,
                unit,
                total,
            } => write!(
                f,
                "Добавлено {added} {unit} к {name}. Теперь всего: {total} {unit}."
            ),
        }
    }
}

/// Result of removing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted { name: String },
    Decremented {
        name: String,
        removed: u32,
        remaining: u32,
        unit: String,
    },
    NotFound { name: String },
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted { name } => write!(f, "{name} полностью удалён из холодильника."),
            Self::Decremented {
                name,
                removed,
                remaining,
                unit,
            } => write!(f, "Удалено {removed} из {name}. Осталось {remaining} {unit}."),
            Self::NotFound { name } => write!(f, "{name} не найден в холодильнике."),
        }
    }
}

/// Result of a delete-fridge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { name: String },
    /// The requester is not in the owner set; the fridge is kept.
    Unauthorized,
    NotFound,
}
