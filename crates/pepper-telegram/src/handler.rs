// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update endpoints: commands, free text and button presses.
//!
//! Each endpoint maps the Telegram update onto the flow engine or the
//! orchestrator and sends the resulting screen back. Failures are logged
//! and answered with a generic apology; they never stop the dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatId, User};
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use pepper_chat::{Action, FlowReply, TextOutcome};
use pepper_core::{Actor, FridgeId, PepperError};

use crate::screens::{self, Screen};
use crate::streaming::{TelegramReply, start_typing_indicator};
use crate::{BotContext, channel_error};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать работу")]
    Start,
    #[command(description = "помощь")]
    Help,
    #[command(rename = "myfridges", description = "показать твои холодильники")]
    MyFridges,
    #[command(description = "очистить историю диалога с нейросетью")]
    Clear,
    #[command(description = "прервать ввод")]
    Cancel,
}

/// Telegram user to actor. Ownership uses the username when there is one,
/// else the numeric id.
pub fn actor(user: &User) -> Actor {
    let id = user.id.0.to_string();
    let owner = user.username.clone().unwrap_or_else(|| id.clone());
    Actor::new(id, owner)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn send_screen(bot: &Bot, chat: ChatId, screen: Screen) -> Result<(), PepperError> {
    let mut request = bot.send_message(chat, screen.text);
    if let Some(keyboard) = screen.keyboard {
        request = request.reply_markup(keyboard);
    }
    request
        .await
        .map(|_| ())
        .map_err(|e| channel_error("send message", e))
}

async fn send_reply(bot: &Bot, chat: ChatId, reply: &FlowReply) -> Result<(), PepperError> {
    send_screen(bot, chat, screens::screen(reply, today())).await
}

/// Logs a failed update and apologizes in the chat.
async fn settle(bot: &Bot, chat: ChatId, result: Result<(), PepperError>) -> HandlerResult {
    if let Err(e) = result {
        error!(chat = chat.0, error = %e, "update handling failed");
        bot.send_message(chat, screens::INTERNAL_ERROR).await?;
    }
    Ok(())
}

pub async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let actor = actor(user);
    let chat = msg.chat.id;
    debug!(user = %actor.user, command = ?cmd, "command received");

    let result = match cmd {
        Command::Start => bot
            .send_message(chat, screens::GREETING)
            .reply_markup(screens::start_keyboard())
            .await
            .map(|_| ())
            .map_err(|e| channel_error("send message", e)),
        Command::Help => bot
            .send_message(chat, screens::HELP)
            .await
            .map(|_| ())
            .map_err(|e| channel_error("send message", e)),
        Command::MyFridges => flow_action(&bot, chat, &ctx, &actor, Action::ShowFridges).await,
        Command::Cancel => flow_action(&bot, chat, &ctx, &actor, Action::Cancel).await,
        Command::Clear => match ctx.flow.clear_conversation(&actor).await {
            Ok(reply) => send_reply(&bot, chat, &reply).await,
            Err(e) => Err(e),
        },
    };
    settle(&bot, chat, result).await
}

async fn flow_action(
    bot: &Bot,
    chat: ChatId,
    ctx: &BotContext,
    actor: &Actor,
    action: Action,
) -> Result<(), PepperError> {
    let reply = ctx.flow.handle_action(actor, action).await?;
    send_reply(bot, chat, &reply).await
}

pub async fn on_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        debug!(msg_id = msg.id.0, "ignoring non-text message");
        return Ok(());
    };
    let actor = actor(user);
    let chat = msg.chat.id;

    let result = match ctx.flow.handle_text(&actor, text).await {
        Ok(TextOutcome::Reply(reply)) => send_reply(&bot, chat, &reply).await,
        Ok(TextOutcome::Chat { fridge }) => answer_question(&bot, chat, &ctx, &actor, fridge, text).await,
        Err(e) => Err(e),
    };
    settle(&bot, chat, result).await
}

async fn answer_question(
    bot: &Bot,
    chat: ChatId,
    ctx: &BotContext,
    actor: &Actor,
    fridge: Option<FridgeId>,
    text: &str,
) -> Result<(), PepperError> {
    let placeholder = bot
        .send_message(chat, screens::THINKING)
        .await
        .map_err(|e| channel_error("send message", e))?;

    let cancel = CancellationToken::new();
    let typing = start_typing_indicator(bot.clone(), chat, cancel.clone());
    let reply = TelegramReply::new(bot.clone(), chat, placeholder.id);
    let result = ctx.rag.answer(actor, fridge, text, &reply).await;
    cancel.cancel();
    if let Err(e) = typing.await {
        debug!(error = %e, "typing indicator task ended abnormally");
    }
    result.map(|_| ())
}

pub async fn on_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> HandlerResult {
    let action = q.data.as_deref().and_then(crate::callback::decode);
    let chat = q.message.as_ref().map(|m| m.chat().id);
    let (Some(action), Some(chat)) = (action, chat) else {
        debug!(data = ?q.data, "ignoring unknown callback");
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let actor = actor(&q.from);

    let reply = match ctx.flow.handle_action(&actor, action).await {
        Ok(reply) => reply,
        Err(e) => {
            bot.answer_callback_query(q.id.clone()).await?;
            return settle(&bot, chat, Err(e)).await;
        }
    };

    if screens::is_alert(&reply) {
        let screen = screens::screen(&reply, today());
        bot.answer_callback_query(q.id.clone())
            .text(screen.text)
            .show_alert(true)
            .await?;
        return Ok(());
    }

    bot.answer_callback_query(q.id.clone()).await?;
    settle(&bot, chat, send_reply(&bot, chat, &reply).await).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, username: Option<&str>) -> User {
        let mut json = serde_json::json!({
            "id": id,
            "is_bot": false,
            "first_name": "Test",
        });
        if let Some(name) = username {
            json["username"] = serde_json::json!(name);
        }
        serde_json::from_value(json).expect("failed to deserialize mock user")
    }

    #[test]
    fn owner_is_the_username() {
        let actor = actor(&user(12345, Some("anna")));
        assert_eq!(actor.user.0, "12345");
        assert_eq!(actor.owner.0, "anna");
    }

    #[test]
    fn owner_falls_back_to_the_id() {
        let actor = actor(&user(12345, None));
        assert_eq!(actor.owner.0, "12345");
    }

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse("/myfridges", "pepper_bot").ok(), Some(Command::MyFridges));
        assert_eq!(Command::parse("/clear@pepper_bot", "pepper_bot").ok(), Some(Command::Clear));
        assert!(Command::parse("/unknown", "pepper_bot").is_err());
    }

    #[test]
    fn descriptions_list_every_command() {
        let text = Command::descriptions().to_string();
        for command in ["/start", "/help", "/myfridges", "/clear", "/cancel"] {
            assert!(text.contains(command), "{command} missing from {text}");
        }
    }
}
