// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk loading of a recipe CSV into the index.
//!
//! Rows are embedded and written in batches of [`BATCH_SIZE`]. Rows with an
//! empty name, ingredient list cell or instruction cell are skipped and do
//! not consume an id, so stored ids are `recipe-0..recipe-{n-1}`.

use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use pepper_config::model::RecipeColumns;
use pepper_core::PepperError;
use pepper_core::traits::EmbeddingAdapter;
use pepper_core::types::EmbeddingInput;

use crate::document::{RecipeRecord, parse_list};
use crate::store::{RecipeStore, StoredRecipe};

/// Rows embedded per store transaction.
pub const BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Clear the index before loading.
    pub force: bool,
    /// Read at most this many data rows.
    pub limit: Option<usize>,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportReport {
    /// The index already held recipes and `force` was not set.
    AlreadyPresent { existing: u64 },
    Imported { imported: usize, skipped: usize },
}

pub struct RecipeImporter {
    store: RecipeStore,
    embedder: Arc<dyn EmbeddingAdapter>,
    columns: RecipeColumns,
}

struct ColumnIndexes {
    name: usize,
    ingredients: usize,
    instructions: usize,
}

impl RecipeImporter {
    pub fn new(
        store: RecipeStore,
        embedder: Arc<dyn EmbeddingAdapter>,
        columns: RecipeColumns,
    ) -> Self {
        Self {
            store,
            embedder,
            columns,
        }
    }

    /// Loads the CSV file at `path`.
    pub async fn import_path(
        &self,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, PepperError> {
        let reader = csv::Reader::from_path(path).map_err(|e| {
            PepperError::Config(format!("cannot open recipe file {}: {e}", path.display()))
        })?;
        self.import_reader(reader, options).await
    }

    /// Loads recipes from any CSV source with a header row.
    pub async fn import_reader<R: std::io::Read>(
        &self,
        mut reader: csv::Reader<R>,
        options: &ImportOptions,
    ) -> Result<ImportReport, PepperError> {
        let existing = self.store.count().await?;
        if existing > 0 {
            if !options.force {
                info!(existing, "recipe index already populated, skipping import");
                return Ok(ImportReport::AlreadyPresent { existing });
            }
            info!(existing, "clearing recipe index");
            self.store.clear().await?;
        }

        let headers = reader
            .headers()
            .map_err(|e| PepperError::Config(format!("cannot read CSV header: {e}")))?
            .clone();
        let columns = self.resolve(&headers)?;

        let progress = if options.progress {
            let bar = match options.limit {
                Some(limit) => ProgressBar::new(limit as u64),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} {pos} rows [{elapsed_precise}] {msg}")
            {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut pending: Vec<RecipeRecord> = Vec::with_capacity(BATCH_SIZE);
        let mut imported = 0usize;
        let mut skipped = 0usize;

        for (row, record) in reader.records().enumerate() {
            if options.limit.is_some_and(|limit| row >= limit) {
                break;
            }
            progress.inc(1);
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(row, error = %e, "skipping unreadable CSV row");
                    skipped += 1;
                    continue;
                }
            };

            let cell = |i: usize| record.get(i).unwrap_or("").trim();
            let name = cell(columns.name);
            let ingredients = cell(columns.ingredients);
            let instructions = cell(columns.instructions);
            if name.is_empty() || ingredients.is_empty() || instructions.is_empty() {
                skipped += 1;
                continue;
            }

            pending.push(RecipeRecord {
                name: name.to_string(),
                ingredients: parse_list(ingredients),
                instructions: parse_list(instructions),
            });
            if pending.len() == BATCH_SIZE {
                imported += self.flush(&mut pending, imported).await?;
                progress.set_message(format!("{imported} imported"));
            }
        }
        imported += self.flush(&mut pending, imported).await?;
        progress.finish_with_message(format!("{imported} imported"));

        info!(imported, skipped, "recipe import finished");
        Ok(ImportReport::Imported { imported, skipped })
    }

    fn resolve(&self, headers: &csv::StringRecord) -> Result<ColumnIndexes, PepperError> {
        let find = |column: &str| {
            headers.iter().position(|h| h == column).ok_or_else(|| {
                PepperError::Config(format!(
                    "column `{column}` not found in recipe CSV (have: {})",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })
        };
        // The id column is optional; ids are assigned sequentially.
        if find(&self.columns.id).is_err() {
            warn!(column = %self.columns.id, "recipe id column missing");
        }
        Ok(ColumnIndexes {
            name: find(&self.columns.name)?,
            ingredients: find(&self.columns.ingredients)?,
            instructions: find(&self.columns.instructions)?,
        })
    }

    async fn flush(
        &self,
        pending: &mut Vec<RecipeRecord>,
        first_id: usize,
    ) -> Result<usize, PepperError> {
        if pending.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(pending);
        let documents: Vec<String> = batch.iter().map(RecipeRecord::to_document).collect();
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: documents.clone(),
            })
            .await?;
        if output.embeddings.len() != batch.len() {
            return Err(PepperError::Internal(format!(
                "embedder returned {} vectors for {} recipes",
                output.embeddings.len(),
                batch.len()
            )));
        }

        let rows: Vec<StoredRecipe> = batch
            .into_iter()
            .zip(documents)
            .zip(output.embeddings)
            .enumerate()
            .map(|(i, ((record, document), embedding))| StoredRecipe {
                id: format!("recipe-{}", first_id + i),
                name: record.name,
                document,
                embedding,
            })
            .collect();
        let count = rows.len();
        self.store.insert_batch(rows).await?;
        Ok(count)
    }
}
