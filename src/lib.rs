//! # wikisync
//!
//! Imports Wikipedia articles into a local article store and keeps an
//! external vector-indexing service in sync with the published ones, then
//! exposes search over that index with local article enrichment.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌──────────┐
//! │ Wikipedia │──▶│ Importer │──▶│  SQLite  │
//! │   API     │   │  (CLI)   │   │ articles │
//! └───────────┘   └──────────┘   └────┬─────┘
//!                                     │
//!                     ┌───────────────┤
//!                     ▼               ▼
//!               ┌──────────┐    ┌──────────┐      ┌────────────────┐
//!               │   Sync   │    │  Search  │◀────▶│ vector service │
//!               │ endpoint │───▶│ endpoint │      │ (store/search) │
//!               └──────────┘    └──────────┘      └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wikisync init                    # create database
//! wikisync import 人工知能          # fetch one Wikipedia article
//! wikisync sync --limit 10         # push published articles to the index
//! wikisync search "machine learning"
//! wikisync serve                   # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Request-level error taxonomy |
//! | [`models`] | Core data types |
//! | [`store`] | Article storage trait and backends |
//! | [`wikipedia`] | Wikipedia page fetcher |
//! | [`importer`] | Article creation from fetched pages |
//! | [`formatter`] | Article → vector record mapping |
//! | [`vector_client`] | Vector service client |
//! | [`sync`] | Article synchronization |
//! | [`search`] | Search with local enrichment |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod error;
pub mod formatter;
pub mod importer;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod status;
pub mod store;
pub mod sync;
pub mod vector_client;
pub mod wikipedia;
