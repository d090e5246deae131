//! Library exports for sessiontron, shared between the binary and tests.

pub mod config;
pub mod controller;
pub mod janitor;
pub mod models;
pub mod service;
pub mod startup;
pub mod store;
pub mod utils;
