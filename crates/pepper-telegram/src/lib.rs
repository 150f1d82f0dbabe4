// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram front end for the Pepper fridge assistant.
//!
//! Runs a teloxide long-polling dispatcher that feeds commands, text and
//! inline button presses into the flow engine, and streams assistant
//! answers by editing a placeholder message in place.

pub mod callback;
pub mod handler;
pub mod markdown;
pub mod screens;
pub mod streaming;

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pepper_chat::{FlowEngine, RagOrchestrator};
use pepper_config::model::TelegramConfig;
use pepper_core::{AdapterType, HealthStatus, PepperError, PluginAdapter};

use crate::handler::Command;

pub(crate) fn channel_error(what: &str, e: teloxide::RequestError) -> PepperError {
    PepperError::Channel {
        message: format!("failed to {what}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Shared state injected into every endpoint.
pub struct BotContext {
    pub flow: Arc<FlowEngine>,
    pub rag: Arc<RagOrchestrator>,
}

/// Routes messages (commands first) and callback queries to their endpoints.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let messages = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handler::on_command),
        )
        .branch(dptree::endpoint(handler::on_message));
    let callbacks = Update::filter_callback_query().endpoint(handler::on_callback);
    dptree::entry().branch(messages).branch(callbacks)
}

pub struct TelegramBot {
    bot: Bot,
    context: Arc<BotContext>,
}

impl TelegramBot {
    /// Requires `telegram.bot_token` to be set.
    pub fn new(
        config: &TelegramConfig,
        flow: Arc<FlowEngine>,
        rag: Arc<RagOrchestrator>,
    ) -> Result<Self, PepperError> {
        let token = config
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PepperError::Config(
                    "telegram.bot_token is required (or set PEPPER_TELEGRAM_BOT_TOKEN)".into(),
                )
            })?;

        Ok(Self {
            bot: Bot::new(token),
            context: Arc::new(BotContext { flow, rag }),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Polls for updates until `cancel` fires, then lets in-flight
    /// handlers finish.
    pub async fn run(&self, cancel: CancellationToken) {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "failed to register bot commands");
        }

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), schema())
            .dependencies(dptree::deps![self.context.clone()])
            .default_handler(|_| async {})
            .error_handler(LoggingErrorHandler::with_custom_text(
                "error in Telegram update handler",
            ))
            .build();

        let shutdown = dispatcher.shutdown_token();
        tokio::spawn(async move {
            cancel.cancelled().await;
            match shutdown.shutdown() {
                Ok(done) => done.await,
                Err(e) => debug!(error = %e, "dispatcher was not running"),
            }
        });

        info!("starting Telegram long polling");
        dispatcher.dispatch().await;
        info!("Telegram dispatcher stopped");
    }
}

#[async_trait]
impl PluginAdapter for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PepperError> {
        match self.bot.get_me().await {
            Ok(me) => {
                debug!(username = ?me.username, "Telegram bot reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), PepperError> {
        debug!("Telegram bot shutting down");
        Ok(())
    }
}
