//! Board use-case service.
//!
//! # Responsibility
//! - Compose a `Board` with a `CardStore` for the interactive shell.
//! - Own the creation workflow for quick-add input.
//!
//! # Invariants
//! - Load failures fall back to the seed card set; they never surface.
//! - Save failures are logged and ignored; in-memory state stays authoritative.
//! - Every state-changing operation persists the full card collection.
//! - Cards with empty titles are never created.

use crate::board::{Board, Direction, DuplicateOutcome, MoveOutcome};
use crate::defaults::default_cards;
use crate::model::card::{Card, TodayState};
use crate::model::column::Column;
use crate::quick_add::parse_quick_add_at;
use crate::repo::card_store::CardStore;
use chrono::{DateTime, Utc};
use log::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardServiceError {
    #[error("card title cannot be empty")]
    EmptyTitle,
    #[error("board has no columns")]
    NoColumns,
}

pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Application-layer owner of the board and its store.
pub struct BoardService<S: CardStore> {
    store: S,
    board: Board,
}

impl<S: CardStore> BoardService<S> {
    /// Loads persisted cards, or seeds the board when none are readable.
    pub fn load(store: S, columns: Vec<Column>) -> Self {
        Self::load_at(store, columns, crate::now_epoch_ms())
    }

    pub fn load_at(store: S, columns: Vec<Column>, now_ms: i64) -> Self {
        let cards = match store.load_cards() {
            Ok(Some(cards)) => {
                info!(
                    "event=board_load module=service status=ok source=store cards={}",
                    cards.len()
                );
                cards
            }
            Ok(None) => {
                info!("event=board_load module=service status=ok source=defaults");
                default_cards(now_ms)
            }
            Err(err) => {
                warn!(
                    "event=board_load module=service status=fallback source=defaults error={err}"
                );
                default_cards(now_ms)
            }
        };
        Self {
            store,
            board: Board::new(columns, cards),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_relative(&mut self, card_id: &str, direction: Direction) -> MoveOutcome {
        let outcome = self.board.move_relative(card_id, direction);
        if outcome.is_moved() {
            self.persist();
        }
        outcome
    }

    pub fn move_to(&mut self, card_id: &str, column_id: &str) -> MoveOutcome {
        let outcome = self.board.move_to(card_id, column_id);
        if outcome.is_moved() {
            self.persist();
        }
        outcome
    }

    pub fn start_next(&mut self) -> MoveOutcome {
        let outcome = self.board.start_next();
        if outcome.is_moved() {
            self.persist();
        }
        outcome
    }

    pub fn archive(&mut self, card_id: &str) -> bool {
        let found = self.board.archive(card_id);
        if found {
            self.persist();
        }
        found
    }

    pub fn upsert(&mut self, card: Card) {
        self.board.upsert(card);
        self.persist();
    }

    pub fn toggle_blocked(&mut self, card_id: &str) -> Option<bool> {
        let blocked = self.board.toggle_blocked(card_id)?;
        self.persist();
        Some(blocked)
    }

    pub fn set_today_state(&mut self, card_id: &str, state: Option<TodayState>) -> bool {
        let found = self.board.set_today_state(card_id, state);
        if found {
            self.persist();
        }
        found
    }

    /// Pin, hide or queue toggle used by the Today actions.
    pub fn toggle_today_state(&mut self, card_id: &str, state: TodayState) -> Option<bool> {
        let enabled = self.board.toggle_today_state(card_id, state)?;
        self.persist();
        Some(enabled)
    }

    pub fn duplicate(&mut self, card_id: &str) -> DuplicateOutcome {
        let outcome = self.board.duplicate(card_id);
        if matches!(outcome, DuplicateOutcome::Created(_)) {
            self.persist();
        }
        outcome
    }

    /// Creates a card from quick-add text.
    ///
    /// The column hint resolves by title prefix; unresolved hints fall back
    /// to the first column.
    pub fn quick_add(&mut self, text: &str) -> BoardServiceResult<Card> {
        self.quick_add_at(text, Utc::now())
    }

    pub fn quick_add_at(&mut self, text: &str, now: DateTime<Utc>) -> BoardServiceResult<Card> {
        let draft = parse_quick_add_at(text, now);
        if !draft.has_title() {
            return Err(BoardServiceError::EmptyTitle);
        }

        let hinted = draft
            .column_hint
            .as_deref()
            .and_then(|hint| self.board.resolve_column_hint(hint));
        let column = hinted
            .or_else(|| self.board.columns().first())
            .ok_or(BoardServiceError::NoColumns)?;
        let column_id = column.id.clone();

        let card = draft.into_card(column_id, now.timestamp_millis());
        self.upsert(card.clone());
        info!(
            "event=card_create module=service status=ok column_id={} tags={}",
            card.column_id,
            card.tags.len()
        );
        Ok(card)
    }

    fn persist(&self) {
        if let Err(err) = self.store.save_cards(self.board.cards()) {
            error!("event=board_save module=service status=error error={err}");
        }
    }
}
