//! Board model: card placement and WIP enforcement.
//!
//! # Responsibility
//! - Own the card collection and the static column sequence.
//! - Move cards by direction or to an explicit column, enforcing WIP limits.
//! - Derive per-column groupings on demand.
//!
//! # Invariants
//! - Every operation is total: unknown ids and policy refusals leave state
//!   unchanged and are reported through the returned outcome.
//! - A move either fully reassigns the card or changes nothing.
//! - WIP count of a column = active cards whose `column_id` equals its id.
//! - Archived cards never appear in groupings or WIP counts.

mod stats;
mod today;

use crate::model::card::{Card, CardId};
use crate::model::column::{Column, ColumnId};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

pub use stats::{BoardStats, ColumnLoad};
pub use today::TodayPlan;

/// Relative move direction along the column sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Parses `next` / `prev` case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next" => Some(Self::Next),
            "prev" | "previous" => Some(Self::Prev),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// Warning payload for a move refused by a column's WIP limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipBlocked {
    pub card_id: CardId,
    pub column_id: ColumnId,
    pub column_title: String,
    pub limit: u32,
    /// Active cards already in the target column.
    pub current: usize,
}

impl Display for WipBlocked {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WIP limit of {} reached for column \"{}\". Move blocked.",
            self.limit, self.column_title
        )
    }
}

/// Why a move left the board untouched without a policy violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMoveReason {
    CardNotFound,
    CardArchived,
    /// The card's current column is not part of the sequence.
    UnknownSourceColumn,
    UnknownTargetColumn,
    /// Relative move past the first or last column.
    AtBoundary,
    AlreadyInColumn,
}

/// Result of a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: ColumnId, to: ColumnId },
    Blocked(WipBlocked),
    Unchanged(NoMoveReason),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// Result of a duplicate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateOutcome {
    /// The copy, already on the board.
    Created(Card),
    Blocked(WipBlocked),
    Unchanged(NoMoveReason),
}

/// In-memory kanban board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
    cards: Vec<Card>,
}

impl Board {
    pub fn new(columns: Vec<Column>, cards: Vec<Card>) -> Self {
        Self { columns, cards }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All cards, active and archived, in collection order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn active_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|card| card.is_active())
    }

    /// Counts active cards currently assigned to `column_id`.
    pub fn wip_count(&self, column_id: &str) -> usize {
        self.active_cards()
            .filter(|card| card.column_id == column_id)
            .count()
    }

    /// Moves a card one column forward or backward.
    pub fn move_relative(&mut self, card_id: &str, direction: Direction) -> MoveOutcome {
        self.move_relative_at(card_id, direction, crate::now_epoch_ms())
    }

    /// Same as [`Board::move_relative`] with an explicit clock reading.
    pub fn move_relative_at(
        &mut self,
        card_id: &str,
        direction: Direction,
        now_ms: i64,
    ) -> MoveOutcome {
        let target_index = match self.relative_target(card_id, direction) {
            Ok(index) => index,
            Err(reason) => {
                debug!(
                    "event=card_move module=board status=noop mode=relative direction={} reason={:?}",
                    direction.as_str(),
                    reason
                );
                return MoveOutcome::Unchanged(reason);
            }
        };
        let target_id = self.columns[target_index].id.clone();
        self.apply_move(card_id, &target_id, now_ms)
    }

    /// Moves a card to an explicit column (drag-and-drop, "move to" sheet).
    pub fn move_to(&mut self, card_id: &str, column_id: &str) -> MoveOutcome {
        self.move_to_at(card_id, column_id, crate::now_epoch_ms())
    }

    /// Same as [`Board::move_to`] with an explicit clock reading.
    pub fn move_to_at(&mut self, card_id: &str, column_id: &str, now_ms: i64) -> MoveOutcome {
        self.apply_move(card_id, column_id, now_ms)
    }

    /// Groups active cards by column id, keyed for every known column.
    ///
    /// Cards keep collection order within a group. Cards pointing at an
    /// unknown column are left out.
    pub fn group_by_column(&self) -> HashMap<ColumnId, Vec<&Card>> {
        let mut grouped: HashMap<ColumnId, Vec<&Card>> = self
            .columns
            .iter()
            .map(|column| (column.id.clone(), Vec::new()))
            .collect();
        for card in self.active_cards() {
            if let Some(group) = grouped.get_mut(&card.column_id) {
                group.push(card);
            }
        }
        grouped
    }

    /// Copies a card into its own column under a fresh id.
    ///
    /// The copy keeps content fields and starts unblocked with no Today tag.
    /// The column's WIP limit applies as for a move.
    pub fn duplicate(&mut self, card_id: &str) -> DuplicateOutcome {
        self.duplicate_at(card_id, crate::now_epoch_ms())
    }

    pub fn duplicate_at(&mut self, card_id: &str, now_ms: i64) -> DuplicateOutcome {
        let Some(source) = self.card(card_id) else {
            return DuplicateOutcome::Unchanged(NoMoveReason::CardNotFound);
        };
        if !source.is_active() {
            return DuplicateOutcome::Unchanged(NoMoveReason::CardArchived);
        }
        let Some(column) = self.column(&source.column_id) else {
            return DuplicateOutcome::Unchanged(NoMoveReason::UnknownSourceColumn);
        };

        let current = self.wip_count(&column.id);
        if !column.admits_one_more(current) {
            return DuplicateOutcome::Blocked(wip_blocked(card_id, column, current));
        }

        let mut copy = Card::new(source.title.clone(), column.id.clone(), now_ms);
        copy.sla_risk = source.sla_risk;
        copy.due_date = source.due_date.clone();
        copy.tags = source.tags.clone();
        copy.effort = source.effort;
        self.cards.push(copy.clone());
        debug!(
            "event=card_duplicate module=board status=ok column_id={}",
            copy.column_id
        );
        DuplicateOutcome::Created(copy)
    }

    /// Marks a card archived. Returns `false` when the id is unknown.
    pub fn archive(&mut self, card_id: &str) -> bool {
        match self.cards.iter_mut().find(|card| card.id == card_id) {
            Some(card) => {
                card.archive();
                debug!("event=card_archive module=board status=ok");
                true
            }
            None => false,
        }
    }

    /// Replaces the card with the same id, or appends it.
    ///
    /// No validation happens here; creation flows reject empty titles first.
    pub fn upsert(&mut self, card: Card) {
        match self.cards.iter_mut().find(|existing| existing.id == card.id) {
            Some(existing) => *existing = card,
            None => self.cards.push(card),
        }
    }

    /// Flips the blocked flag. Returns the new value, or `None` if not found.
    pub fn toggle_blocked(&mut self, card_id: &str) -> Option<bool> {
        let card = self.cards.iter_mut().find(|card| card.id == card_id)?;
        card.blocked = !card.blocked;
        Some(card.blocked)
    }

    /// Resolves a quick-add column hint by case-insensitive title prefix.
    pub fn resolve_column_hint(&self, hint: &str) -> Option<&Column> {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .find(|column| column.title.to_lowercase().starts_with(&hint))
    }

    /// Active cards of one column, highest SLA risk first.
    pub fn focus_cards(&self, column_id: &str) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self
            .active_cards()
            .filter(|card| card.column_id == column_id)
            .collect();
        cards.sort_by(|a, b| b.sla_risk.cmp(&a.sla_risk));
        cards
    }

    fn relative_target(&self, card_id: &str, direction: Direction) -> Result<usize, NoMoveReason> {
        let card = self.card(card_id).ok_or(NoMoveReason::CardNotFound)?;
        let current = self
            .columns
            .iter()
            .position(|column| column.id == card.column_id)
            .ok_or(NoMoveReason::UnknownSourceColumn)?;
        match direction {
            Direction::Next if current + 1 < self.columns.len() => Ok(current + 1),
            Direction::Prev if current > 0 => Ok(current - 1),
            _ => Err(NoMoveReason::AtBoundary),
        }
    }

    fn apply_move(&mut self, card_id: &str, column_id: &str, now_ms: i64) -> MoveOutcome {
        let Some(index) = self.cards.iter().position(|card| card.id == card_id) else {
            return MoveOutcome::Unchanged(NoMoveReason::CardNotFound);
        };
        let Some(target) = self.column(column_id) else {
            return MoveOutcome::Unchanged(NoMoveReason::UnknownTargetColumn);
        };
        let card = &self.cards[index];
        if !card.is_active() {
            return MoveOutcome::Unchanged(NoMoveReason::CardArchived);
        }
        if card.column_id == target.id {
            return MoveOutcome::Unchanged(NoMoveReason::AlreadyInColumn);
        }

        // The moving card sits in another column, so it is never part of this count.
        let current = self.wip_count(&target.id);
        if !target.admits_one_more(current) {
            return MoveOutcome::Blocked(wip_blocked(card_id, target, current));
        }

        let to = target.id.clone();
        let card = &mut self.cards[index];
        let from = std::mem::replace(&mut card.column_id, to.clone());
        card.age = card.age.max(now_ms);
        debug!(
            "event=card_move module=board status=ok from={} to={}",
            from, to
        );
        MoveOutcome::Moved { from, to }
    }
}

fn wip_blocked(card_id: &str, column: &Column, current: usize) -> WipBlocked {
    let blocked = WipBlocked {
        card_id: card_id.to_string(),
        column_id: column.id.clone(),
        column_title: column.title.clone(),
        limit: column.wip_limit.unwrap_or_default(),
        current,
    };
    warn!(
        "event=wip_blocked module=board status=blocked column_id={} limit={} current={}",
        blocked.column_id, blocked.limit, blocked.current
    );
    blocked
}
