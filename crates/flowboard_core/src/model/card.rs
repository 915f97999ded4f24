//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical card record persisted by the board.
//! - Provide lifecycle helpers for archive semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another card.
//! - `is_archived` is one-way: no core path sets it back to `false`.
//! - `age` records the last column entry, not creation time.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::column::ColumnId;

/// Stable card identifier.
///
/// Seed data uses short ids (`card-1`); created cards use UUID v4 text.
pub type CardId = String;

/// Ordinal urgency classification, independent of due date.
///
/// Declaration order drives `Ord`: `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SlaRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl SlaRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// T-shirt effort size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effort {
    S,
    M,
    L,
}

impl Effort {
    /// Parses one effort letter, case-insensitively.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'S' => Some(Self::S),
            'M' => Some(Self::M),
            'L' => Some(Self::L),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
        }
    }
}

impl Display for Effort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planning tag used by the "Today" view. Orthogonal to `column_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodayState {
    Pinned,
    Suppressed,
    Derived,
}

impl TodayState {
    /// Parses the persisted lowercase name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pinned" => Some(Self::Pinned),
            "suppressed" => Some(Self::Suppressed),
            "derived" => Some(Self::Derived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pinned => "pinned",
            Self::Suppressed => "suppressed",
            Self::Derived => "derived",
        }
    }
}

/// Canonical card record.
///
/// Wire names follow the persisted camelCase layout so stored card lists
/// stay readable by older shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub column_id: ColumnId,
    /// Epoch milliseconds of the last time the card entered its column.
    pub age: i64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub sla_risk: SlaRisk,
    /// ISO-8601 date or datetime string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_state: Option<TodayState>,
    /// Epoch milliseconds; only meaningful while `today_state` is pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_at: Option<i64>,
}

impl Card {
    /// Creates a new active card with a generated stable ID.
    pub fn new(title: impl Into<String>, column_id: impl Into<ColumnId>, now_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, column_id, now_ms)
    }

    /// Creates a card with a caller-provided ID.
    ///
    /// Used by seed data and import paths where identity already exists.
    pub fn with_id(
        id: impl Into<CardId>,
        title: impl Into<String>,
        column_id: impl Into<ColumnId>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_id: column_id.into(),
            age: now_ms,
            blocked: false,
            sla_risk: SlaRisk::Low,
            due_date: None,
            tags: Vec::new(),
            effort: None,
            is_archived: false,
            today_state: None,
            pinned_at: None,
        }
    }

    /// Returns whether this card counts toward groupings and WIP.
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    /// Archives the card. There is intentionally no inverse.
    pub fn archive(&mut self) {
        self.is_archived = true;
    }
}
