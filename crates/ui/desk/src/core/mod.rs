//! Core of the desk.
//!
//!   - `state`    : `DeskState`, the export wizard state and its counters
//!   - `intent_model` / `reducer` : intents and executor results folded into state
//!   - `effects`  : declarative `Effect` / `TaskKind` model
//!   - `executor` : background task runner (HTTP, downloads, timers)
//!   - `app` / `loop` : the interactive application and its event loop
//!
//! The reducers are pure and usable without a terminal; the headless export
//! runs them directly.
pub mod app;
pub mod effects;
pub mod executor;
pub mod intent_model;
pub mod r#loop;
pub mod reducer;
pub mod state;
