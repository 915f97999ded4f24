//! Quick-add shorthand parser.
//!
//! # Responsibility
//! - Turn one line of free text into a structured card draft.
//!
//! # Invariants
//! - Pure: the same text and clock reading always produce the same draft.
//! - Total: malformed tokens drop their field, parsing never fails.
//! - Every token is stripped from the title, valid or not.
//!
//! Grammar: a token is a marker followed by at least one non-whitespace
//! character. It may start mid-word (`bug#ui`); text before the marker
//! stays in the title.
//! - `#tag` appends a tag (repeatable).
//! - `!due` sets the due date (`today`, `tomorrow` or a date); first wins.
//! - `^s|m|l` sets effort; first valid wins.
//! - `>column` sets a lower-cased column hint; first wins.

use crate::model::card::{Card, Effort};
use crate::model::column::ColumnId;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const OFFSET_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M%#z";

/// Structured result of parsing one quick-add line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickAddDraft {
    /// Remaining text; empty when the input held only tokens.
    pub title: String,
    pub tags: Vec<String>,
    /// RFC 3339 timestamp, millisecond precision, UTC.
    pub due_date: Option<String>,
    pub effort: Option<Effort>,
    /// Lower-cased; resolved against column titles by the caller.
    pub column_hint: Option<String>,
}

impl QuickAddDraft {
    /// Callers must refuse submission when this is `false`.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Builds a new card in `column_id` from this draft.
    pub fn into_card(self, column_id: impl Into<ColumnId>, now_ms: i64) -> Card {
        let mut card = Card::new(self.title, column_id, now_ms);
        card.tags = self.tags;
        card.due_date = self.due_date;
        card.effort = self.effort;
        card
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Tag(&'a str),
    Due(&'a str),
    Effort(&'a str),
    Column(&'a str),
}

impl<'a> Token<'a> {
    /// Splits `word` at its first marker that has a body.
    ///
    /// Returns the title text before the marker and the token after it.
    fn split(word: &'a str) -> Option<(&'a str, Self)> {
        word.char_indices().find_map(|(idx, marker)| {
            let rest = &word[idx + marker.len_utf8()..];
            if rest.is_empty() {
                return None;
            }
            let token = match marker {
                '#' => Self::Tag(rest),
                '!' => Self::Due(rest),
                '^' => Self::Effort(rest),
                '>' => Self::Column(rest),
                _ => return None,
            };
            Some((&word[..idx], token))
        })
    }
}

/// Parses `text` against the current wall clock.
pub fn parse_quick_add(text: &str) -> QuickAddDraft {
    parse_quick_add_at(text, Utc::now())
}

/// Parses `text`, resolving relative due dates against `now`.
pub fn parse_quick_add_at(text: &str, now: DateTime<Utc>) -> QuickAddDraft {
    let mut draft = QuickAddDraft::default();
    let mut title_words = Vec::new();

    for word in text.split_whitespace() {
        let Some((prefix, token)) = Token::split(word) else {
            title_words.push(word);
            continue;
        };
        if !prefix.is_empty() {
            title_words.push(prefix);
        }
        match token {
            Token::Tag(tag) => draft.tags.push(tag.to_string()),
            Token::Due(value) => {
                if draft.due_date.is_none() {
                    draft.due_date = resolve_due_date(value, now);
                }
            }
            Token::Effort(value) => {
                if draft.effort.is_none() {
                    draft.effort = parse_effort(value);
                }
            }
            Token::Column(value) => {
                if draft.column_hint.is_none() {
                    draft.column_hint = Some(value.to_lowercase());
                }
            }
        }
    }

    draft.title = title_words.join(" ");
    draft
}

fn parse_effort(value: &str) -> Option<Effort> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Effort::from_letter(letter),
        _ => None,
    }
}

fn resolve_due_date(value: &str, now: DateTime<Utc>) -> Option<String> {
    let resolved = match value.to_ascii_lowercase().as_str() {
        "today" => now,
        "tomorrow" => now + Duration::days(1),
        _ => parse_date(value)?,
    };
    Some(resolved.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(utc) = value.strip_suffix(['Z', 'z']) {
        return parse_naive_datetime(utc).map(|parsed| parsed.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, OFFSET_DATETIME_FORMAT) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(parsed) = parse_naive_datetime(value) {
        return Some(parsed.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        // Year-month only: first day of the month.
        .or_else(|| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_effort, resolve_due_date, Token};
    use crate::model::card::Effort;
    use chrono::{TimeZone, Utc};

    #[test]
    fn split_requires_marker_and_body() {
        assert_eq!(Token::split("#ui"), Some(("", Token::Tag("ui"))));
        assert_eq!(Token::split(">Do"), Some(("", Token::Column("Do"))));
        assert_eq!(Token::split("#"), None);
        assert_eq!(Token::split("@alice"), None);
        assert_eq!(Token::split("plain"), None);
    }

    #[test]
    fn split_finds_marker_inside_word() {
        assert_eq!(Token::split("bug#urgent"), Some(("bug", Token::Tag("urgent"))));
        assert_eq!(Token::split("C#"), None);
        assert_eq!(
            Token::split("call!2026-04-01"),
            Some(("call", Token::Due("2026-04-01")))
        );
    }

    #[test]
    fn effort_accepts_single_letter_only() {
        assert_eq!(parse_effort("l"), Some(Effort::L));
        assert_eq!(parse_effort("x"), None);
        assert_eq!(parse_effort("sm"), None);
    }

    #[test]
    fn due_date_keywords_resolve_against_clock() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 8, 30, 0).unwrap();
        assert_eq!(
            resolve_due_date("TODAY", now).as_deref(),
            Some("2026-03-09T08:30:00.000Z")
        );
        assert_eq!(
            resolve_due_date("Tomorrow", now).as_deref(),
            Some("2026-03-10T08:30:00.000Z")
        );
    }

    #[test]
    fn parse_date_supports_common_shapes() {
        let midnight = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2026-04-01"), Some(midnight));
        assert_eq!(parse_date("2026/04/01"), Some(midnight));
        assert_eq!(parse_date("04/01/2026"), Some(midnight));
        assert_eq!(
            parse_date("2026-04-01T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("2026-04-01T09:15"),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(
            parse_date("2026-04-01T09:15Z"),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(
            parse_date("2026-04-01T09:15+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 7, 15, 0).unwrap())
        );
        assert_eq!(parse_date("2026-04"), Some(midnight));
        assert_eq!(parse_date("2026-13"), None);
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("someday"), None);
    }
}
