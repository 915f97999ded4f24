//! Board domain model.
//!
//! # Responsibility
//! - Define the card and column records shared by board logic and storage.
//!
//! # Invariants
//! - Every card is identified by a stable `CardId`.
//! - Archiving is a flag, cards are never physically deleted by core.

pub mod card;
pub mod column;
