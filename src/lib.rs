//! ledgerview: terminal client for a ledger HTTP/JSON service

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod ui;
