//! Ingestion and search backend for the Fundalytics listing dashboard.
//!
//! Scraped Funda listings are normalized into documents with a cover image,
//! written to a Weaviate collection and served back as tables and similarity
//! search results.

pub mod app;
pub mod ingest;
pub mod models;
pub mod presentation;
pub mod scrapers;
pub mod settings;
pub mod store;
