//! "Today" planning projection.
//!
//! `today_state` is an independent tag; it never constrains `column_id` and
//! carries no cross-field rules beyond `pinned_at` tracking pin time.

use super::{Board, MoveOutcome, NoMoveReason};
use crate::model::card::{Card, TodayState};
use crate::model::column::Column;

const DOING_COLUMN_TITLE: &str = "In Progress";

/// Cards surfaced by the Today view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayPlan<'a> {
    /// Active cards in the "In Progress" column.
    pub doing: Vec<&'a Card>,
    /// Pinned cards not already in progress, oldest pin first.
    pub pinned: Vec<&'a Card>,
    /// Up-next candidates not already in progress.
    pub derived: Vec<&'a Card>,
}

impl Board {
    /// Column treated as "doing" by the Today view, if configured.
    pub fn doing_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.title == DOING_COLUMN_TITLE)
    }

    /// Sets or clears the Today tag. Returns `false` when the id is unknown.
    pub fn set_today_state(&mut self, card_id: &str, state: Option<TodayState>) -> bool {
        self.set_today_state_at(card_id, state, crate::now_epoch_ms())
    }

    pub fn set_today_state_at(
        &mut self,
        card_id: &str,
        state: Option<TodayState>,
        now_ms: i64,
    ) -> bool {
        let Some(card) = self.cards.iter_mut().find(|card| card.id == card_id) else {
            return false;
        };
        card.pinned_at = match state {
            Some(TodayState::Pinned) => Some(now_ms),
            _ => None,
        };
        card.today_state = state;
        true
    }

    /// Turns `state` on, or off when the card already carries it.
    ///
    /// Returns whether the state is now set, or `None` if not found.
    pub fn toggle_today_state(&mut self, card_id: &str, state: TodayState) -> Option<bool> {
        self.toggle_today_state_at(card_id, state, crate::now_epoch_ms())
    }

    pub fn toggle_today_state_at(
        &mut self,
        card_id: &str,
        state: TodayState,
        now_ms: i64,
    ) -> Option<bool> {
        let current = self.card(card_id)?.today_state;
        let next = (current != Some(state)).then_some(state);
        self.set_today_state_at(card_id, next, now_ms);
        Some(next.is_some())
    }

    pub fn today_plan(&self) -> TodayPlan<'_> {
        let doing_id = self.doing_column().map(|column| column.id.as_str());
        let in_doing = |card: &Card| Some(card.column_id.as_str()) == doing_id;

        let doing = self.active_cards().filter(|card| in_doing(card)).collect();
        let mut pinned: Vec<&Card> = self
            .active_cards()
            .filter(|card| !in_doing(card) && card.today_state == Some(TodayState::Pinned))
            .collect();
        pinned.sort_by_key(|card| card.pinned_at.unwrap_or(i64::MAX));
        let derived = self
            .active_cards()
            .filter(|card| !in_doing(card) && card.today_state == Some(TodayState::Derived))
            .collect();

        TodayPlan {
            doing,
            pinned,
            derived,
        }
    }

    /// Pulls the first up-next card into the doing column, WIP rules applying.
    pub fn start_next(&mut self) -> MoveOutcome {
        self.start_next_at(crate::now_epoch_ms())
    }

    pub fn start_next_at(&mut self, now_ms: i64) -> MoveOutcome {
        let Some(doing_id) = self.doing_column().map(|column| column.id.clone()) else {
            return MoveOutcome::Unchanged(NoMoveReason::UnknownTargetColumn);
        };
        let Some(next_id) = self
            .today_plan()
            .derived
            .first()
            .map(|card| card.id.clone())
        else {
            return MoveOutcome::Unchanged(NoMoveReason::CardNotFound);
        };
        self.move_to_at(&next_id, &doing_id, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, MoveOutcome, NoMoveReason};
    use crate::model::card::{Card, TodayState};
    use crate::model::column::Column;

    fn board(cards: Vec<Card>) -> Board {
        Board::new(
            vec![
                Column::new("todo", "To Do"),
                Column::new("doing", "In Progress").with_wip_limit(1),
            ],
            cards,
        )
    }

    #[test]
    fn pinning_stamps_time_and_clearing_drops_it() {
        let mut board = board(vec![Card::with_id("x", "t", "todo", 0)]);
        assert!(board.set_today_state_at("x", Some(TodayState::Pinned), 42));
        assert_eq!(board.card("x").unwrap().pinned_at, Some(42));

        assert!(board.set_today_state_at("x", Some(TodayState::Suppressed), 50));
        let card = board.card("x").unwrap();
        assert_eq!(card.today_state, Some(TodayState::Suppressed));
        assert_eq!(card.pinned_at, None);
        assert!(!board.set_today_state_at("missing", None, 0));
    }

    #[test]
    fn toggle_switches_between_states_and_off() {
        let mut board = board(vec![Card::with_id("x", "t", "todo", 0)]);

        assert_eq!(
            board.toggle_today_state_at("x", TodayState::Pinned, 7),
            Some(true)
        );
        assert_eq!(board.card("x").unwrap().pinned_at, Some(7));
        assert_eq!(
            board.toggle_today_state_at("x", TodayState::Suppressed, 8),
            Some(true)
        );
        let card = board.card("x").unwrap();
        assert_eq!(card.today_state, Some(TodayState::Suppressed));
        assert_eq!(card.pinned_at, None);
        assert_eq!(
            board.toggle_today_state_at("x", TodayState::Suppressed, 9),
            Some(false)
        );
        assert_eq!(board.card("x").unwrap().today_state, None);
        assert_eq!(
            board.toggle_today_state_at("ghost", TodayState::Pinned, 9),
            None
        );
    }

    #[test]
    fn plan_partitions_cards_and_hides_suppressed() {
        let in_progress = Card::with_id("doing", "t", "doing", 0);
        let mut late_pin = Card::with_id("late", "t", "todo", 0);
        late_pin.today_state = Some(TodayState::Pinned);
        late_pin.pinned_at = Some(20);
        let mut early_pin = Card::with_id("early", "t", "todo", 0);
        early_pin.today_state = Some(TodayState::Pinned);
        early_pin.pinned_at = Some(10);
        let mut derived = Card::with_id("next", "t", "todo", 0);
        derived.today_state = Some(TodayState::Derived);
        let mut hidden = Card::with_id("hidden", "t", "todo", 0);
        hidden.today_state = Some(TodayState::Suppressed);

        let board = board(vec![in_progress, late_pin, early_pin, derived, hidden]);
        let plan = board.today_plan();
        let ids = |cards: &[&Card]| cards.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&plan.doing), vec!["doing"]);
        assert_eq!(ids(&plan.pinned), vec!["early", "late"]);
        assert_eq!(ids(&plan.derived), vec!["next"]);
    }

    #[test]
    fn start_next_respects_doing_wip_limit() {
        let mut derived = Card::with_id("next", "t", "todo", 0);
        derived.today_state = Some(TodayState::Derived);
        let mut board = board(vec![derived]);

        assert!(board.start_next_at(5).is_moved());
        assert_eq!(board.card("next").unwrap().column_id, "doing");

        let mut second = Card::with_id("second", "t", "todo", 0);
        second.today_state = Some(TodayState::Derived);
        board.upsert(second);
        assert!(board.start_next_at(6).is_blocked());
    }

    #[test]
    fn start_next_without_candidates_is_noop() {
        let mut board = board(vec![Card::with_id("x", "t", "todo", 0)]);
        assert_eq!(
            board.start_next_at(1),
            MoveOutcome::Unchanged(NoMoveReason::CardNotFound)
        );
    }
}
