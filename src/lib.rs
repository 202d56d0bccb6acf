//! Hybrid translation service for the news verification frontend.
//!
//! Resolves translations for article titles, summaries, chat replies and UI
//! labels through a fixed chain: prebuilt strings, in-memory cache, remote
//! cache table, primary provider, secondary provider, local mock.

pub mod config;
pub mod db;
pub mod i18n;
pub mod retry;
pub mod security;
pub mod server;
pub mod translation;
