// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state machine.
//!
//! Every user is in exactly one [`UserState`]. Button presses arrive as
//! [`Action`]s and free text as plain strings; both produce a [`FlowReply`]
//! describing what to show next. Free text outside of an intent is handed
//! back as [`TextOutcome::Chat`] for the recipe assistant.
//!
//! State lives in memory only and is lost on restart.

use std::sync::Arc;

use dashmap::DashMap;
use strum::IntoStaticStr;
use tracing::{debug, info};

use pepper_core::{
    AddOutcome, Actor, DEFAULT_UNIT, DeleteOutcome, Fridge, FridgeId, FridgeSummary,
    InventoryStore, NewProduct, PepperError, RemoveOutcome, UserId,
};

use crate::metrics;

/// Step of the add-product intent. Each variant carries what was collected
/// so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddStep {
    Name,
    Quantity {
        name: String,
    },
    Unit {
        name: String,
        quantity: u32,
    },
    Expires {
        name: String,
        quantity: u32,
        unit: String,
    },
}

/// Step of the remove-product intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveStep {
    Name,
    Quantity { name: String },
}

/// What a user is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserState {
    /// No intent; free text goes to the assistant.
    Idle { fridge: Option<FridgeId> },
    /// Waiting for the name of a new fridge. Keeps the previous selection
    /// so cancelling restores it.
    NewFridge { fridge: Option<FridgeId> },
    AddProduct { fridge: FridgeId, step: AddStep },
    RemoveProduct { fridge: FridgeId, step: RemoveStep },
}

impl Default for UserState {
    fn default() -> Self {
        Self::Idle { fridge: None }
    }
}

impl UserState {
    pub fn selected_fridge(&self) -> Option<FridgeId> {
        match self {
            Self::Idle { fridge } | Self::NewFridge { fridge } => *fridge,
            Self::AddProduct { fridge, .. } | Self::RemoveProduct { fridge, .. } => Some(*fridge),
        }
    }

    pub fn has_intent(&self) -> bool {
        !matches!(self, Self::Idle { .. })
    }

    fn abandoned(&self) -> Self {
        Self::Idle {
            fridge: self.selected_fridge(),
        }
    }
}

/// A button press, decoded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowFridges,
    SelectFridge(FridgeId),
    NewFridge,
    DeleteMenu,
    ConfirmDelete(FridgeId),
    AddProduct(FridgeId),
    RemoveProduct(FridgeId),
    ListProducts(FridgeId),
    Cancel,
}

/// What the user should see after an event.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FlowReply {
    /// The user's fridges plus the new/delete options.
    FridgeList { fridges: Vec<FridgeSummary> },
    /// A fridge was selected; shows its products and the product actions.
    FridgeSelected { fridge: Fridge },
    Products { fridge: Fridge },
    AskFridgeName,
    FridgeCreated { fridge: FridgeSummary },
    DeleteMenu { fridges: Vec<FridgeSummary> },
    NothingToDelete,
    FridgeDeleted { name: String },
    /// Delete refused because the user is not an owner.
    OnlyOwnerCanDelete,
    AskProductName,
    AskQuantity,
    AskRemoveQuantity,
    AskUnit,
    AskExpiry,
    /// Quantity input did not parse; the same step is asked again.
    NeedNumber,
    ProductAdded(AddOutcome),
    ProductRemoved(RemoveOutcome),
    NotOwner,
    FridgeNotFound { id: FridgeId },
    Cancelled,
    NothingToCancel,
    ConversationCleared,
}

/// Result of feeding free text into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    Reply(FlowReply),
    /// No intent is active: answer the text as a question about `fridge`.
    Chat { fridge: Option<FridgeId> },
}

/// Result of one step of a multi-step intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance<S, T> {
    /// Stay in or move to `S` and show the reply.
    Step(S, FlowReply),
    /// All input is collected.
    Done(T),
}

impl AddStep {
    /// Consumes one line of user input.
    pub fn advance(self, text: &str) -> Advance<AddStep, NewProduct> {
        match self {
            Self::Name => match text.trim() {
                "" => Advance::Step(Self::Name, FlowReply::AskProductName),
                name => Advance::Step(
                    Self::Quantity {
                        name: name.to_string(),
                    },
                    FlowReply::AskQuantity,
                ),
            },
            Self::Quantity { name } => match parse_quantity(text) {
                Some(quantity) => Advance::Step(Self::Unit { name, quantity }, FlowReply::AskUnit),
                None => Advance::Step(Self::Quantity { name }, FlowReply::NeedNumber),
            },
            Self::Unit { name, quantity } => {
                let unit = optional_input(text).unwrap_or(DEFAULT_UNIT).to_string();
                Advance::Step(
                    Self::Expires {
                        name,
                        quantity,
                        unit,
                    },
                    FlowReply::AskExpiry,
                )
            }
            Self::Expires {
                name,
                quantity,
                unit,
            } => Advance::Done(NewProduct {
                name,
                quantity,
                unit,
                expires: optional_input(text).map(String::from),
            }),
        }
    }
}

impl RemoveStep {
    pub fn advance(self, text: &str) -> Advance<RemoveStep, (String, u32)> {
        match self {
            Self::Name => match text.trim() {
                "" => Advance::Step(Self::Name, FlowReply::AskProductName),
                name => Advance::Step(
                    Self::Quantity {
                        name: name.to_string(),
                    },
                    FlowReply::AskRemoveQuantity,
                ),
            },
            Self::Quantity { name } => match parse_quantity(text) {
                Some(quantity) => Advance::Done((name, quantity)),
                None => Advance::Step(Self::Quantity { name }, FlowReply::NeedNumber),
            },
        }
    }
}

fn parse_quantity(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

/// Optional fields treat blank input and a lone `-` as "not given", since
/// chat clients cannot send an empty message.
fn optional_input(text: &str) -> Option<&str> {
    match text.trim() {
        "" | "-" => None,
        value => Some(value),
    }
}

/// Drives every user's [`UserState`] against the inventory store.
pub struct FlowEngine {
    states: DashMap<UserId, UserState>,
    store: Arc<dyn InventoryStore>,
}

impl FlowEngine {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            states: DashMap::new(),
            store,
        }
    }

    /// Current state of `user`; users never seen are idle.
    pub fn state(&self, user: &UserId) -> UserState {
        self.states
            .get(user)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    pub fn selected_fridge(&self, user: &UserId) -> Option<FridgeId> {
        self.state(user).selected_fridge()
    }

    fn set_state(&self, user: &UserId, state: UserState) {
        debug!(user = %user, state = ?state, "flow state changed");
        if state == UserState::default() {
            self.states.remove(user);
        } else {
            self.states.insert(user.clone(), state);
        }
    }

    /// Handles a button press.
    pub async fn handle_action(
        &self,
        actor: &Actor,
        action: Action,
    ) -> Result<FlowReply, PepperError> {
        let current = self.state(&actor.user);
        let reply = match action {
            Action::ShowFridges => {
                self.set_state(&actor.user, current.abandoned());
                FlowReply::FridgeList {
                    fridges: self.owned_summaries(actor).await?,
                }
            }
            Action::SelectFridge(id) => match self.owned_fridge(actor, id).await? {
                Ok(fridge) => {
                    self.set_state(&actor.user, UserState::Idle { fridge: Some(id) });
                    FlowReply::FridgeSelected { fridge }
                }
                Err(refusal) => refusal,
            },
            Action::ListProducts(id) => match self.owned_fridge(actor, id).await? {
                Ok(fridge) => {
                    self.set_state(&actor.user, UserState::Idle { fridge: Some(id) });
                    FlowReply::Products { fridge }
                }
                Err(refusal) => refusal,
            },
            Action::NewFridge => {
                self.set_state(
                    &actor.user,
                    UserState::NewFridge {
                        fridge: current.selected_fridge(),
                    },
                );
                FlowReply::AskFridgeName
            }
            Action::DeleteMenu => {
                self.set_state(&actor.user, current.abandoned());
                let fridges = self.owned_summaries(actor).await?;
                if fridges.is_empty() {
                    FlowReply::NothingToDelete
                } else {
                    FlowReply::DeleteMenu { fridges }
                }
            }
            Action::ConfirmDelete(id) => self.delete(actor, &current, id).await?,
            Action::AddProduct(id) => match self.owned_fridge(actor, id).await? {
                Ok(_) => {
                    self.set_state(
                        &actor.user,
                        UserState::AddProduct {
                            fridge: id,
                            step: AddStep::Name,
                        },
                    );
                    FlowReply::AskProductName
                }
                Err(refusal) => refusal,
            },
            Action::RemoveProduct(id) => match self.owned_fridge(actor, id).await? {
                Ok(_) => {
                    self.set_state(
                        &actor.user,
                        UserState::RemoveProduct {
                            fridge: id,
                            step: RemoveStep::Name,
                        },
                    );
                    FlowReply::AskProductName
                }
                Err(refusal) => refusal,
            },
            Action::Cancel => {
                if current.has_intent() {
                    self.set_state(&actor.user, current.abandoned());
                    FlowReply::Cancelled
                } else {
                    FlowReply::NothingToCancel
                }
            }
        };
        metrics::record_flow_event((&reply).into());
        Ok(reply)
    }

    /// Handles a text message.
    pub async fn handle_text(&self, actor: &Actor, text: &str) -> Result<TextOutcome, PepperError> {
        let reply = match self.state(&actor.user) {
            UserState::Idle { fridge } => return Ok(TextOutcome::Chat { fridge }),
            UserState::NewFridge { .. } => match text.trim() {
                "" => FlowReply::AskFridgeName,
                name => {
                    let fridge = self.store.create_fridge(name, &actor.owner).await?;
                    info!(user = %actor.user, fridge = %fridge.id, "fridge created");
                    self.set_state(
                        &actor.user,
                        UserState::Idle {
                            fridge: Some(fridge.id),
                        },
                    );
                    FlowReply::FridgeCreated {
                        fridge: FridgeSummary::from(&fridge),
                    }
                }
            },
            UserState::AddProduct { fridge, step } => match step.advance(text) {
                Advance::Step(step, reply) => {
                    self.set_state(&actor.user, UserState::AddProduct { fridge, step });
                    reply
                }
                Advance::Done(product) => match self.store.add_product(fridge, product).await? {
                    Some(outcome) => {
                        self.set_state(&actor.user, UserState::Idle { fridge: Some(fridge) });
                        FlowReply::ProductAdded(outcome)
                    }
                    None => self.vanished(actor, fridge),
                },
            },
            UserState::RemoveProduct { fridge, step } => match step.advance(text) {
                Advance::Step(step, reply) => {
                    self.set_state(&actor.user, UserState::RemoveProduct { fridge, step });
                    reply
                }
                Advance::Done((name, quantity)) => {
                    match self.store.remove_product(fridge, &name, quantity).await? {
                        Some(outcome) => {
                            self.set_state(&actor.user, UserState::Idle { fridge: Some(fridge) });
                            FlowReply::ProductRemoved(outcome)
                        }
                        None => self.vanished(actor, fridge),
                    }
                }
            },
        };
        metrics::record_flow_event((&reply).into());
        Ok(TextOutcome::Reply(reply))
    }

    /// Clears the persisted conversation with the assistant. Flow state is
    /// kept.
    pub async fn clear_conversation(&self, actor: &Actor) -> Result<FlowReply, PepperError> {
        self.store.clear_conversation(&actor.user).await?;
        info!(user = %actor.user, "conversation cleared");
        metrics::record_flow_event("conversation_cleared");
        Ok(FlowReply::ConversationCleared)
    }

    async fn delete(
        &self,
        actor: &Actor,
        current: &UserState,
        id: FridgeId,
    ) -> Result<FlowReply, PepperError> {
        let reply = match self.store.delete_fridge(id, &actor.owner).await? {
            DeleteOutcome::Deleted { name } => {
                info!(user = %actor.user, fridge = %id, "fridge deleted");
                let selected = current.selected_fridge().filter(|selected| *selected != id);
                self.set_state(&actor.user, UserState::Idle { fridge: selected });
                FlowReply::FridgeDeleted { name }
            }
            DeleteOutcome::Unauthorized => FlowReply::OnlyOwnerCanDelete,
            DeleteOutcome::NotFound => FlowReply::FridgeNotFound { id },
        };
        Ok(reply)
    }

    /// The fridge if `actor` owns it, else the refusal to show.
    async fn owned_fridge(
        &self,
        actor: &Actor,
        id: FridgeId,
    ) -> Result<Result<Fridge, FlowReply>, PepperError> {
        Ok(match self.store.get_fridge(id).await? {
            None => Err(FlowReply::FridgeNotFound { id }),
            Some(fridge) if !fridge.is_owned_by(&actor.owner) => {
                debug!(user = %actor.user, fridge = %id, "refused: not an owner");
                Err(FlowReply::NotOwner)
            }
            Some(fridge) => Ok(fridge),
        })
    }

    async fn owned_summaries(&self, actor: &Actor) -> Result<Vec<FridgeSummary>, PepperError> {
        Ok(self
            .store
            .list_owned(&actor.owner)
            .await?
            .iter()
            .map(FridgeSummary::from)
            .collect())
    }

    /// The fridge disappeared while an intent was collecting input.
    fn vanished(&self, actor: &Actor, id: FridgeId) -> FlowReply {
        self.set_state(&actor.user, UserState::default());
        FlowReply::FridgeNotFound { id }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn collect_add(inputs: &[&str]) -> (Vec<AddStep>, Option<NewProduct>) {
        let mut visited = vec![AddStep::Name];
        let mut step = AddStep::Name;
        for input in inputs {
            match step.advance(input) {
                Advance::Step(next, _) => {
                    visited.push(next.clone());
                    step = next;
                }
                Advance::Done(product) => return (visited, Some(product)),
            }
        }
        (visited, None)
    }

    #[test]
    fn add_collects_fields_in_order() {
        let (_, product) = collect_add(&["Молоко", "2", "л", "2026-05-01"]);
        assert_eq!(
            product,
            Some(NewProduct {
                name: "Молоко".into(),
                quantity: 2,
                unit: "л".into(),
                expires: Some("2026-05-01".into()),
            })
        );
    }

    #[test]
    fn blank_and_dash_fall_back_to_defaults() {
        let (_, product) = collect_add(&["соль", "1", "-", " "]);
        let product = product.expect("complete");
        assert_eq!(product.unit, DEFAULT_UNIT);
        assert_eq!(product.expires, None);
    }

    #[test]
    fn expiry_is_kept_as_typed() {
        let (_, product) = collect_add(&["сыр", "1", "кг", "послезавтра"]);
        assert_eq!(product.expect("complete").expires.as_deref(), Some("послезавтра"));
    }

    #[test]
    fn bad_quantity_repeats_the_step() {
        let step = AddStep::Quantity { name: "яйца".into() };
        assert_eq!(
            step.clone().advance("много"),
            Advance::Step(step.clone(), FlowReply::NeedNumber)
        );
        assert_eq!(
            step.clone().advance("-3"),
            Advance::Step(step, FlowReply::NeedNumber)
        );
    }

    #[test]
    fn blank_name_asks_again() {
        assert_eq!(
            RemoveStep::Name.advance("  "),
            Advance::Step(RemoveStep::Name, FlowReply::AskProductName)
        );
    }

    #[test]
    fn remove_completes_after_quantity() {
        let step = match RemoveStep::Name.advance("Яйца") {
            Advance::Step(step, FlowReply::AskRemoveQuantity) => step,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(step.advance(" 5 "), Advance::Done(("Яйца".into(), 5)));
    }

    #[test]
    fn selection_survives_intents() {
        let id = FridgeId(4);
        let state = UserState::AddProduct {
            fridge: id,
            step: AddStep::Name,
        };
        assert_eq!(state.selected_fridge(), Some(id));
        assert_eq!(state.abandoned(), UserState::Idle { fridge: Some(id) });
        assert!(!UserState::default().has_intent());
    }

    fn step_rank(step: &AddStep) -> u8 {
        match step {
            AddStep::Name => 0,
            AddStep::Quantity { .. } => 1,
            AddStep::Unit { .. } => 2,
            AddStep::Expires { .. } => 3,
        }
    }

    proptest! {
        #[test]
        fn steps_never_skip_or_go_back(inputs in proptest::collection::vec("[a-z0-9 -]{0,6}", 0..12)) {
            let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();
            let (visited, _) = collect_add(&inputs);
            for pair in visited.windows(2) {
                let (from, to) = (step_rank(&pair[0]), step_rank(&pair[1]));
                prop_assert!(to == from || to == from + 1);
            }
        }

        #[test]
        fn non_numbers_never_pass_quantity(input in "[^0-9]*") {
            let step = AddStep::Quantity { name: "мука".into() };
            let stays = matches!(step.advance(&input), Advance::Step(AddStep::Quantity { .. }, _));
            prop_assert!(stays || input.trim().parse::<u32>().is_ok());
        }
    }
}
