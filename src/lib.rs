//! Library exports for booktracker, shared between the binary and tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod navigator;
pub mod providers;
pub mod screens;
pub mod search;
pub mod shell;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
