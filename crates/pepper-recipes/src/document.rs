// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipe records and the document text shown to the language model.

/// One recipe as read from the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl RecipeRecord {
    /// Renders the indexed document text.
    pub fn to_document(&self) -> String {
        let ingredients = if self.ingredients.is_empty() {
            "No ingredients listed".to_string()
        } else {
            self.ingredients.join("\n- ")
        };
        let instructions = if self.instructions.is_empty() {
            "No instructions provided".to_string()
        } else {
            self.instructions.join("\n")
        };
        format!(
            "Recipe: {}\n\nIngredients:\n- {ingredients}\n\nInstructions:\n{instructions}",
            self.name
        )
    }
}

/// Parses a list cell written either as a JSON array (`["a", "b"]`) or as
/// an R vector (`c("a", "b")`).
pub fn parse_list(raw: &str) -> Vec<String> {
    let text = raw.replace("\r\n", "");
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if let Ok(items) = serde_json::from_str::<Vec<String>>(text) {
        return items;
    }

    let inner = if let Some(body) = text.strip_prefix("c(").and_then(|t| t.strip_suffix(')')) {
        body
    } else if let Some(body) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        body
    } else {
        text
    };

    inner
        .split("\", \"")
        .map(|item| item.trim_matches(|c| c == ' ' || c == '"'))
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
