//! Basic search-sync usage example.
//!
//! Demonstrates:
//! 1. Building an engine over the in-memory collaborators
//! 2. Seeding a document corpus across two locales
//! 3. Running the full reindex pipeline
//! 4. Incremental per-save indexing
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use serde_json::json;

use search_sync::{
    Document, InMemoryDocumentStore, InMemorySearchBackend, LocalLockService, LocaleSource,
    SearchSync, SearchSyncConfig, StaticLocales,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    search_sync::init_logging(true);

    // ─────────────────────────────────────────────────────────────────────
    // 1. Configure and build the engine
    // ─────────────────────────────────────────────────────────────────────
    let config = SearchSyncConfig {
        extra_fields: vec!["summary".into()],
        locale_analyzers: [(
            "de".to_string(),
            json!({"analysis": {"analyzer": {"default": {"type": "german"}}}}),
        )]
        .into(),
        ..Default::default()
    };

    let store = Arc::new(InMemoryDocumentStore::new());
    let backend = Arc::new(InMemorySearchBackend::new());
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en", "de"])));

    let engine = SearchSync::new(
        config,
        store.clone(),
        backend.clone(),
        Arc::new(LocalLockService::new()),
        locales,
    );

    // ─────────────────────────────────────────────────────────────────────
    // 2. Seed a corpus: tagged and untagged documents
    // ─────────────────────────────────────────────────────────────────────
    for i in 0..250 {
        store.insert(Document::from_json(
            format!("doc-{i:05}"),
            json!({
                "title": format!("Document {i}"),
                "body": format!("Body text for document number {i}"),
                "tags": ["demo"],
                "summary": format!("Summary {i}"),
            }),
        ));
    }
    store.insert(
        Document::from_json("doc-german", json!({"title": "Hallo Welt"})).with_locale("de"),
    );

    // ─────────────────────────────────────────────────────────────────────
    // 3. Full reindex: drop, recreate, stream, refresh
    // ─────────────────────────────────────────────────────────────────────
    let report = engine.reindex().await?;
    println!(
        "reindexed {} of {} documents in {} pages",
        report.indexed, report.total, report.pages
    );
    for index in backend.index_names() {
        println!("  {index}: {} documents", backend.doc_count(&index));
    }

    // ─────────────────────────────────────────────────────────────────────
    // 4. Incremental save: visible immediately, no pipeline involved
    // ─────────────────────────────────────────────────────────────────────
    let doc = Document::from_json("doc-fresh", json!({"title": "Just saved"}));
    let written = engine.index_document(&doc).await?;
    println!("incremental save wrote {written} command(s)");
    println!(
        "doc-fresh visible in documentsen: {}",
        backend.visible_doc("documentsen", "doc-fresh").is_some()
    );

    Ok(())
}
