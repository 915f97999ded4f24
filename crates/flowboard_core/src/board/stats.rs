//! Aggregate board statistics.

use super::Board;
use crate::model::column::{ColumnId, WipState};
use serde::Serialize;

const MS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Per-column load snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLoad {
    pub column_id: ColumnId,
    pub title: String,
    pub count: usize,
    pub wip_limit: Option<u32>,
    pub state: WipState,
}

/// Board-wide counters derived from the active card set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStats {
    pub active_cards: usize,
    pub blocked_cards: usize,
    pub archived_cards: usize,
    pub columns: Vec<ColumnLoad>,
    /// Mean time in column of cards sitting in "Done", in days.
    /// `0.0` when there is no such column or it is empty.
    pub avg_cycle_time_days: f64,
}

impl Board {
    /// Computes statistics against the given clock reading.
    pub fn stats(&self, now_ms: i64) -> BoardStats {
        let grouped = self.group_by_column();
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let count = grouped.get(&column.id).map_or(0, Vec::len);
                ColumnLoad {
                    column_id: column.id.clone(),
                    title: column.title.clone(),
                    count,
                    wip_limit: column.wip_limit,
                    state: column.wip_state(count),
                }
            })
            .collect();

        let done_ages: Vec<i64> = self
            .columns
            .iter()
            .find(|column| column.title.eq_ignore_ascii_case("done"))
            .and_then(|column| grouped.get(&column.id))
            .map(|cards| cards.iter().map(|card| now_ms - card.age).collect())
            .unwrap_or_default();
        let avg_cycle_time_days = if done_ages.is_empty() {
            0.0
        } else {
            let total: i64 = done_ages.iter().sum();
            total as f64 / done_ages.len() as f64 / MS_PER_DAY
        };

        BoardStats {
            active_cards: self.active_cards().count(),
            blocked_cards: self.active_cards().filter(|card| card.blocked).count(),
            archived_cards: self.cards.len() - self.active_cards().count(),
            columns,
            avg_cycle_time_days,
        }
    }
}
