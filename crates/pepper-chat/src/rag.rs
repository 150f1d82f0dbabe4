// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounded, streamed answers to cooking questions.
//!
//! [`RagOrchestrator::answer`] turns a question into a model call grounded
//! in the user's fridge and the nearest recipes, streams the answer into a
//! [`LiveReply`], and records both sides in the conversation log. Upstream
//! failures become part of the answer text instead of errors.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, info, warn};

use pepper_config::PepperConfig;
use pepper_core::types::ProviderRequest;
use pepper_core::{
    Actor, ChatMessage, ConversationEntry, FridgeId, InventoryStore, LiveReply, PepperError,
    ProviderAdapter, RetrievalIndex, Role,
};

use crate::listing::render_listing;
use crate::metrics;

/// Stands in for the fridge contents when no usable fridge is selected.
pub const NO_FRIDGE: &str = "❌ The user has not chosen a fridge. If the fridge contents are \
needed, ask the user to *choose a fridge* (they have such an option) or to describe the \
products themselves.";

/// Shown when the final formatted answer cannot be displayed.
pub const RENDER_FAILED: &str = "Произошла ошибка, попробуйте повторить запрос";

/// Used when the model streamed nothing.
pub const EMPTY_ANSWER: &str = "⚠️ Модель вернула пустой ответ.";

const NO_RECIPES: &str = "No matching recipes were found; rely on general cooking knowledge.";

/// Inline notice that replaces or ends an answer when a service fails.
pub fn unavailable_notice(error: &PepperError) -> String {
    format!("⚠️ Сервис недоступен: {error}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagSettings {
    /// Recipes retrieved per question.
    pub top_k: usize,
    /// Characters streamed between preview updates.
    pub flush_threshold: usize,
    pub user_language: String,
    pub index_language: String,
    /// Most recent log entries sent to the model; `None` sends the whole log.
    pub history_limit: Option<usize>,
}

impl RagSettings {
    pub fn from_config(config: &PepperConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            flush_threshold: config.chat.flush_threshold,
            user_language: config.chat.user_language.clone(),
            index_language: config.retrieval.index_language.clone(),
            history_limit: config.chat.history_limit,
        }
    }

    pub fn translation_enabled(&self) -> bool {
        self.user_language.trim().to_lowercase() != self.index_language.trim().to_lowercase()
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self::from_config(&PepperConfig::default())
    }
}

/// Counts the failure against `stage` and passes the error on.
fn at(stage: &'static str) -> impl FnOnce(PepperError) -> PepperError {
    move |e| {
        metrics::record_upstream_error(stage);
        e
    }
}

pub struct RagOrchestrator {
    store: Arc<dyn InventoryStore>,
    index: Arc<dyn RetrievalIndex>,
    provider: Arc<dyn ProviderAdapter>,
    settings: RagSettings,
}

impl RagOrchestrator {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        index: Arc<dyn RetrievalIndex>,
        provider: Arc<dyn ProviderAdapter>,
        settings: RagSettings,
    ) -> Self {
        Self {
            store,
            index,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> &RagSettings {
        &self.settings
    }

    /// Answers `text` from `actor`, streaming into `reply`, and returns the
    /// answer as logged.
    ///
    /// The question is logged before anything can fail upstream. Only
    /// storage errors are returned; service failures end up in the answer.
    pub async fn answer(
        &self,
        actor: &Actor,
        fridge: Option<FridgeId>,
        text: &str,
        reply: &dyn LiveReply,
    ) -> Result<String, PepperError> {
        let started = Instant::now();
        let contents = self.fridge_contents(actor, fridge).await?;
        let history = self.store.get_conversation(&actor.user).await?;
        self.store
            .append_conversation(&actor.user, Role::User, text)
            .await?;

        let query = history
            .iter()
            .map(|entry| entry.content.as_str())
            .chain(std::iter::once(text))
            .collect::<Vec<_>>()
            .join("\n");

        let full = match self.retrieve(&query).await {
            Ok(recipes) => {
                let messages = self.messages(&contents, &recipes, history, text);
                self.generate(messages, reply).await
            }
            Err(e) => {
                warn!(user = %actor.user, error = %e, "recipe retrieval failed");
                unavailable_notice(&e)
            }
        };

        if let Err(e) = reply.render(&full).await {
            warn!(user = %actor.user, error = %e, "final render failed, sending plain notice");
            if let Err(e) = reply.plain(RENDER_FAILED).await {
                warn!(user = %actor.user, error = %e, "plain notice failed");
            }
        }

        self.store
            .append_conversation(&actor.user, Role::Assistant, &full)
            .await?;
        let elapsed = started.elapsed();
        metrics::record_answer(elapsed.as_secs_f64());
        info!(
            user = %actor.user,
            chars = full.chars().count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "answer delivered"
        );
        Ok(full)
    }

    async fn fridge_contents(
        &self,
        actor: &Actor,
        fridge: Option<FridgeId>,
    ) -> Result<String, PepperError> {
        let Some(id) = fridge else {
            return Ok(NO_FRIDGE.to_string());
        };
        match self.store.get_fridge(id).await? {
            Some(fridge) if fridge.is_owned_by(&actor.owner) => {
                Ok(render_listing(&fridge, chrono::Local::now().date_naive()))
            }
            _ => {
                debug!(user = %actor.user, fridge = %id, "selected fridge unusable");
                Ok(NO_FRIDGE.to_string())
            }
        }
    }

    /// Recipe documents for `query`, in the user's language.
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, PepperError> {
        let translate = self.settings.translation_enabled();
        let query = if translate {
            self.translate(query, &self.settings.index_language)
                .await
                .map_err(at("translate"))?
        } else {
            query.to_string()
        };

        let vector = self.index.embed(&query).await.map_err(at("embed"))?;
        let found = self
            .index
            .query(&vector, self.settings.top_k)
            .await
            .map_err(at("retrieve"))?;
        debug!(count = found.len(), "recipes retrieved");

        let mut documents = Vec::with_capacity(found.len());
        for recipe in found {
            let document = if translate {
                self.translate(&recipe.document, &self.settings.user_language)
                    .await
                    .map_err(at("translate"))?
            } else {
                recipe.document
            };
            documents.push(document);
        }
        Ok(documents)
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, PepperError> {
        let request = ProviderRequest::new(vec![
            ChatMessage::system(format!(
                "Translate the user's message into {language}. Output only the translation and nothing else."
            )),
            ChatMessage::user(text),
        ]);
        let response = self.provider.complete(request).await?;
        Ok(response.content.trim().to_string())
    }

    fn system_prompt(&self, contents: &str, recipes: &[String]) -> String {
        let recipes = if recipes.is_empty() {
            NO_RECIPES.to_string()
        } else {
            format!("## {}", recipes.join("\n\n## "))
        };
        format!(
            "You are a cooking assistant who answers questions about recipes and food. \
             Always answer entirely in {language}. \
             Do not give any advice that is not about cooking.\n\n\
             Use the following information to make the answer more precise.\n\n\
             # User's fridge contents:\n{contents}\n\n\
             # Relevant recipes:\n{recipes}\n",
            language = self.settings.user_language,
        )
    }

    fn messages(
        &self,
        contents: &str,
        recipes: &[String],
        history: Vec<ConversationEntry>,
        text: &str,
    ) -> Vec<ChatMessage> {
        let skip = self
            .settings
            .history_limit
            .map_or(0, |limit| history.len().saturating_sub(limit));
        let mut messages = Vec::with_capacity(history.len() - skip + 2);
        messages.push(ChatMessage::system(self.system_prompt(contents, recipes)));
        messages.extend(history.into_iter().skip(skip).map(ChatMessage::from));
        messages.push(ChatMessage::user(text));
        messages
    }

    /// Streams the answer, pushing previews every `flush_threshold`
    /// characters. Preview failures are ignored.
    async fn generate(&self, messages: Vec<ChatMessage>, reply: &dyn LiveReply) -> String {
        let mut stream = match self.provider.stream(ProviderRequest::new(messages)).await {
            Ok(stream) => stream,
            Err(e) => {
                metrics::record_upstream_error("generate");
                warn!(error = %e, "generation failed to start");
                return unavailable_notice(&e);
            }
        };

        let mut full = String::new();
        let mut pending = 0usize;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    full.push_str(&chunk.text);
                    pending += chunk.text.chars().count();
                    if pending >= self.settings.flush_threshold {
                        if let Err(e) = reply.preview(&full).await {
                            debug!(error = %e, "preview update failed");
                        }
                        pending = 0;
                    }
                    if chunk.done {
                        break;
                    }
                }
                Err(e) => {
                    metrics::record_upstream_error("generate");
                    warn!(error = %e, "generation stream broke");
                    if !full.is_empty() {
                        full.push_str("\n\n");
                    }
                    full.push_str(&unavailable_notice(&e));
                    break;
                }
            }
        }

        if full.trim().is_empty() {
            return EMPTY_ANSWER.to_string();
        }
        full
    }
}

#[cfg(test)]
mod tests {
    use pepper_test_utils::{MockIndex, MockProvider, RecordingReply, memory_inventory};
    use tracing_test::traced_test;

    use super::*;

    fn settings() -> RagSettings {
        RagSettings {
            top_k: 2,
            flush_threshold: 5,
            user_language: "Russian".into(),
            index_language: "Russian".into(),
            history_limit: None,
        }
    }

    #[test]
    fn translation_follows_languages() {
        assert!(!settings().translation_enabled());
        let mut s = settings();
        s.index_language = "english ".into();
        assert!(s.translation_enabled());
        assert!(RagSettings::default().translation_enabled());
    }

    #[test]
    fn notice_names_the_failure() {
        let notice = unavailable_notice(&PepperError::unavailable("ollama", "refused"));
        assert_eq!(notice, "⚠️ Сервис недоступен: ollama unavailable: refused");
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_previews_are_logged_and_ignored() {
        let store = Arc::new(memory_inventory().await);
        let index = Arc::new(MockIndex::new(["Блины"]));
        let provider = Arc::new(MockProvider::with_responses(["Сделайте блины с молоком."]).chunk_chars(3));
        let rag = RagOrchestrator::new(store, index, provider, settings());
        let reply = RecordingReply::new();
        reply.fail_previews();

        let answer = rag
            .answer(&Actor::new("1", "anna"), None, "Что приготовить?", &reply)
            .await
            .unwrap();

        assert_eq!(answer, "Сделайте блины с молоком.");
        assert!(!reply.previews().is_empty());
        assert_eq!(reply.last_text().as_deref(), Some(answer.as_str()));
        assert!(logs_contain("preview update failed"));
    }

    #[tokio::test]
    async fn empty_stream_gets_a_notice() {
        let store = Arc::new(memory_inventory().await);
        let index = Arc::new(MockIndex::new(Vec::<String>::new()));
        let provider = Arc::new(MockProvider::with_responses([""]));
        let rag = RagOrchestrator::new(store, index, provider.clone(), settings());
        let reply = RecordingReply::new();

        let answer = rag
            .answer(&Actor::new("1", "anna"), None, "?", &reply)
            .await
            .unwrap();
        assert_eq!(answer, EMPTY_ANSWER);

        let system = &provider.requests().await[0].messages[0].content;
        assert!(system.contains(NO_RECIPES));
    }
}
