//! Terminal desk for the volunteer opportunity portal.
//!
//! The binary (`src/main.rs`) wires these modules together; they are public so
//! the integration tests can drive the headless export against a fake portal.
pub mod action;
pub mod cli;
pub mod components;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod headless;
pub mod pages;
pub mod tui;
