//! Column model.
//!
//! Columns form a fixed ordered sequence supplied as configuration; the core
//! never adds, removes or reorders them.

use serde::{Deserialize, Serialize};

pub type ColumnId = String;

/// One ordered workflow stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Load of a column relative to its WIP limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WipState {
    Unlimited,
    Under,
    AtLimit,
    OverLimit,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            wip_limit: None,
            color: None,
        }
    }

    pub fn with_wip_limit(mut self, limit: u32) -> Self {
        self.wip_limit = Some(limit);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Returns whether the column accepts one more card while holding `count`.
    pub fn admits_one_more(&self, count: usize) -> bool {
        match self.wip_limit {
            Some(limit) => count < limit as usize,
            None => true,
        }
    }

    /// Classifies `count` occupants against the limit.
    pub fn wip_state(&self, count: usize) -> WipState {
        let Some(limit) = self.wip_limit else {
            return WipState::Unlimited;
        };
        let limit = limit as usize;
        if count > limit {
            WipState::OverLimit
        } else if count == limit {
            WipState::AtLimit
        } else {
            WipState::Under
        }
    }
}
