// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pepper recipes` commands and the embedding setup shared with `serve`.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use pepper_config::PepperConfig;
use pepper_config::model::RetrievalConfig;
use pepper_core::PepperError;
use pepper_core::traits::EmbeddingAdapter;
use pepper_recipes::{
    ImportOptions, ImportReport, ModelManager, OnnxEmbedder, RecipeImporter, RecipeStore,
};
use pepper_storage::{Database, SqliteInventory};
use tracing::{debug, info};

/// Downloads the embedding model on first use and loads it.
pub async fn load_embedder(config: &RetrievalConfig) -> Result<Arc<OnnxEmbedder>, PepperError> {
    let manager = ModelManager::new(config.model_dir.clone(), config.model_name.clone());
    info!("ensuring embedding model is available...");
    let model_path = manager.ensure_model().await?;
    info!(path = %model_path.display(), "embedding model ready");
    Ok(Arc::new(OnnxEmbedder::new(&model_path)?))
}

/// Loads `retrieval.import_path` when the index is still empty.
pub async fn bootstrap_index(
    config: &PepperConfig,
    db: &Database,
    embedder: Arc<dyn EmbeddingAdapter>,
) -> Result<(), PepperError> {
    let Some(path) = config.retrieval.import_path.as_deref() else {
        debug!("no retrieval.import_path configured, skipping bulk load");
        return Ok(());
    };

    let importer = RecipeImporter::new(
        RecipeStore::new(db.clone()),
        embedder,
        config.retrieval.columns.clone(),
    );
    let report = importer
        .import_path(Path::new(path), &ImportOptions::default())
        .await?;
    if let ImportReport::Imported { imported, skipped } = report {
        info!(imported, skipped, path, "recipe index populated");
    }
    Ok(())
}

/// Runs `pepper recipes import`.
pub async fn run_import(
    config: &PepperConfig,
    csv: &Path,
    force: bool,
    limit: Option<usize>,
) -> Result<(), PepperError> {
    let inventory = SqliteInventory::open(&config.storage).await?;
    let embedder = load_embedder(&config.retrieval).await?;
    let importer = RecipeImporter::new(
        RecipeStore::new(inventory.database().clone()),
        embedder,
        config.retrieval.columns.clone(),
    );
    let options = ImportOptions {
        force,
        limit,
        progress: std::io::stderr().is_terminal(),
    };

    match importer.import_path(csv, &options).await? {
        ImportReport::AlreadyPresent { existing } => {
            println!("index already holds {existing} recipes, pass --force to rebuild it");
        }
        ImportReport::Imported { imported, skipped } => {
            println!("imported {imported} recipes ({skipped} rows skipped)");
        }
    }
    Ok(())
}

/// Runs `pepper recipes count`.
pub async fn run_count(config: &PepperConfig) -> Result<(), PepperError> {
    let inventory = SqliteInventory::open(&config.storage).await?;
    let count = RecipeStore::new(inventory.database().clone()).count().await?;
    println!("{count}");
    Ok(())
}
