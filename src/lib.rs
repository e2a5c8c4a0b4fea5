//! Catalog synchronization service library
//!
//! Ingests an upstream game catalog, normalizes it into reference entities
//! (categories, platforms, developers, publishers), enriches each game with
//! detail-page metadata and imports cover/gallery media into the content
//! store. The binary in `main.rs` wires the HTTP trigger around
//! [`sync::SyncService`], which is the pipeline entry point.

pub mod catalog;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod models;
pub mod store;
pub mod sync;
pub mod utils;
pub mod web;
