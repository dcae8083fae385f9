/*
 * Responsibility
 * - crate の公開モジュール
 * - binary (main.rs) と integration test の両方から使う
 */
pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod plugin;
pub mod services;
pub mod state;
