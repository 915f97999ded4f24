//! Core decision layer for Flowboard, a personal kanban board.
//! This crate owns card placement, WIP enforcement and quick-add parsing.

pub mod board;
pub mod db;
pub mod defaults;
pub mod logging;
pub mod model;
pub mod quick_add;
pub mod repo;
pub mod service;

pub use board::{
    Board, BoardStats, ColumnLoad, Direction, DuplicateOutcome, MoveOutcome, NoMoveReason,
    TodayPlan, WipBlocked,
};
pub use defaults::{default_cards, default_columns, STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{Card, CardId, Effort, SlaRisk, TodayState};
pub use model::column::{Column, ColumnId, WipState};
pub use quick_add::{parse_quick_add, parse_quick_add_at, QuickAddDraft};
pub use repo::card_store::{CardStore, SqliteCardStore, StoreError, StoreResult};
pub use service::board_service::{BoardService, BoardServiceError, BoardServiceResult};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
