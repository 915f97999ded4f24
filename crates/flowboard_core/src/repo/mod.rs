//! Persistence contracts for board state.
//!
//! # Responsibility
//! - Define the storage boundary the board service writes through.
//! - Isolate SQLite and JSON details from board logic.

pub mod card_store;
