//! FFI use-case API for the Flutter shell.
//!
//! # Responsibility
//! - Expose board use-cases to Dart via FRB as plain envelopes.
//! - Open storage per call so the shell holds no Rust-side handles.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - WIP refusals come back as `ok=false` with `wip_blocked=true`, not errors.

use flowboard_core::db::open_db;
use flowboard_core::{
    core_version as core_version_inner, default_columns, init_logging as init_logging_inner,
    parse_quick_add, ping as ping_inner, Board, BoardService, Card, Column, Direction,
    DuplicateOutcome, MoveOutcome, NoMoveReason, SqliteCardStore, TodayState, STORAGE_KEY,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const BOARD_DB_FILE_NAME: &str = "flowboard.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
// Each call loads and saves the whole card list; one writer at a time.
static BOARD_LOCK: Mutex<()> = Mutex::new(());

/// Health check for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat card projection for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCardItem {
    pub card_id: String,
    pub title: String,
    pub age_epoch_ms: i64,
    pub blocked: bool,
    /// `low|medium|high`.
    pub sla_risk: String,
    pub due_date: Option<String>,
    pub tags: Vec<String>,
    /// `S|M|L`.
    pub effort: Option<String>,
    /// `pinned|suppressed|derived`.
    pub today_state: Option<String>,
}

/// One column with its active cards, in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumnItem {
    pub column_id: String,
    pub title: String,
    pub wip_limit: Option<u32>,
    pub color: Option<String>,
    pub cards: Vec<BoardCardItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub columns: Vec<BoardColumnItem>,
    /// Empty on success; diagnostics otherwise.
    pub message: String,
}

/// Action envelope for board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    pub ok: bool,
    pub card_id: Option<String>,
    pub wip_blocked: bool,
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, card_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            card_id: Some(card_id.into()),
            wip_blocked: false,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            card_id: None,
            wip_blocked: false,
            message: message.into(),
        }
    }

    fn wip_blocked(card_id: &str, message: String) -> Self {
        Self {
            ok: false,
            card_id: Some(card_id.to_string()),
            wip_blocked: true,
            message,
        }
    }

    fn from_move(card_id: &str, outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Moved { to, .. } => Self::success(format!("Moved to {to}."), card_id),
            MoveOutcome::Blocked(blocked) => Self::wip_blocked(card_id, blocked.to_string()),
            MoveOutcome::Unchanged(reason) => Self {
                ok: false,
                card_id: Some(card_id.to_string()),
                wip_blocked: false,
                message: no_move_message(reason).to_string(),
            },
        }
    }
}

/// Parsed quick-add preview for live chips while typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAddPreview {
    pub title: String,
    pub tags: Vec<String>,
    pub due_date: Option<String>,
    pub effort: Option<String>,
    pub column_hint: Option<String>,
    /// Title of the column the hint resolves to, if any.
    pub column_title: Option<String>,
    /// `false` when the title is empty and submission must be refused.
    pub can_submit: bool,
}

/// Returns every column with its active cards.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardSnapshot {
    match with_board_service(|service| {
        let board = service.board();
        let grouped = board.group_by_column();
        board
            .columns()
            .iter()
            .map(|column| {
                let cards = grouped.get(&column.id).map(Vec::as_slice).unwrap_or(&[]);
                to_column_item(column, cards)
            })
            .collect::<Vec<_>>()
    }) {
        Ok(columns) => BoardSnapshot {
            columns,
            message: String::new(),
        },
        Err(err) => BoardSnapshot {
            columns: Vec::new(),
            message: format!("board_snapshot failed: {err}"),
        },
    }
}

/// Returns one column with its cards ordered by SLA risk, highest first.
///
/// `column` is a column id or a title prefix.
#[flutter_rust_bridge::frb(sync)]
pub fn board_focus(column: String) -> BoardSnapshot {
    match with_board_service(|service| {
        let board = service.board();
        board
            .column(&column)
            .or_else(|| board.resolve_column_hint(&column))
            .map(|target| to_column_item(target, &board.focus_cards(&target.id)))
    }) {
        Ok(Some(item)) => BoardSnapshot {
            columns: vec![item],
            message: String::new(),
        },
        Ok(None) => BoardSnapshot {
            columns: Vec::new(),
            message: "Column not found.".to_string(),
        },
        Err(err) => BoardSnapshot {
            columns: Vec::new(),
            message: format!("board_focus failed: {err}"),
        },
    }
}

/// Moves a card by `next` or `prev` (swipe outcome).
#[flutter_rust_bridge::frb(sync)]
pub fn board_move(card_id: String, direction: String) -> BoardActionResponse {
    let Some(direction) = Direction::parse(&direction) else {
        return BoardActionResponse::failure(format!(
            "board_move failed: unknown direction `{direction}`"
        ));
    };
    match with_board_service(|service| service.move_relative(&card_id, direction)) {
        Ok(outcome) => BoardActionResponse::from_move(&card_id, outcome),
        Err(err) => BoardActionResponse::failure(format!("board_move failed: {err}")),
    }
}

/// Moves a card to an explicit column (drop outcome or move sheet).
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_to(card_id: String, column_id: String) -> BoardActionResponse {
    match with_board_service(|service| service.move_to(&card_id, &column_id)) {
        Ok(outcome) => BoardActionResponse::from_move(&card_id, outcome),
        Err(err) => BoardActionResponse::failure(format!("board_move_to failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_archive(card_id: String) -> BoardActionResponse {
    match with_board_service(|service| service.archive(&card_id)) {
        Ok(true) => BoardActionResponse::success("Card archived.", card_id),
        Ok(false) => BoardActionResponse::failure("Card not found."),
        Err(err) => BoardActionResponse::failure(format!("board_archive failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_blocked(card_id: String) -> BoardActionResponse {
    match with_board_service(|service| service.toggle_blocked(&card_id)) {
        Ok(Some(true)) => BoardActionResponse::success("Card blocked.", card_id),
        Ok(Some(false)) => BoardActionResponse::success("Card unblocked.", card_id),
        Ok(None) => BoardActionResponse::failure("Card not found."),
        Err(err) => BoardActionResponse::failure(format!("board_toggle_blocked failed: {err}")),
    }
}

/// Copies a card into its own column; the WIP limit applies.
#[flutter_rust_bridge::frb(sync)]
pub fn board_duplicate(card_id: String) -> BoardActionResponse {
    match with_board_service(|service| service.duplicate(&card_id)) {
        Ok(DuplicateOutcome::Created(copy)) => {
            BoardActionResponse::success("Card duplicated.", copy.id)
        }
        Ok(DuplicateOutcome::Blocked(blocked)) => {
            BoardActionResponse::wip_blocked(&card_id, blocked.to_string())
        }
        Ok(DuplicateOutcome::Unchanged(reason)) => {
            BoardActionResponse::failure(no_move_message(reason))
        }
        Err(err) => BoardActionResponse::failure(format!("board_duplicate failed: {err}")),
    }
}

/// Toggles a Today tag: `pinned`, `suppressed` or `derived`.
///
/// Passing `None` clears whatever tag the card carries.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_today_state(card_id: String, state: Option<String>) -> BoardActionResponse {
    let parsed = match state.as_deref().map(TodayState::parse) {
        Some(None) => {
            return BoardActionResponse::failure(format!(
                "board_set_today_state failed: unknown state `{}`",
                state.as_deref().unwrap_or_default()
            ));
        }
        Some(Some(state)) => Some(state),
        None => None,
    };
    let result = with_board_service(|service| match parsed {
        Some(state) => service
            .toggle_today_state(&card_id, state)
            .map(|enabled| enabled.then_some(state)),
        None => service
            .set_today_state(&card_id, None)
            .then_some(None),
    });
    match result {
        Ok(Some(Some(state))) => {
            BoardActionResponse::success(format!("Card marked {}.", state.as_str()), card_id)
        }
        Ok(Some(None)) => BoardActionResponse::success("Today tag cleared.", card_id),
        Ok(None) => BoardActionResponse::failure("Card not found."),
        Err(err) => BoardActionResponse::failure(format!("board_set_today_state failed: {err}")),
    }
}

/// Moves the first up-next card into "In Progress"; the WIP limit applies.
#[flutter_rust_bridge::frb(sync)]
pub fn board_start_next() -> BoardActionResponse {
    let result = with_board_service(|service| {
        let next_id = service
            .board()
            .today_plan()
            .derived
            .first()
            .map(|card| card.id.clone());
        (next_id, service.start_next())
    });
    match result {
        Ok((Some(card_id), outcome)) => BoardActionResponse::from_move(&card_id, outcome),
        Ok((None, _)) => BoardActionResponse::failure("No card is queued for today."),
        Err(err) => BoardActionResponse::failure(format!("board_start_next failed: {err}")),
    }
}

/// Creates a card from quick-add shorthand.
#[flutter_rust_bridge::frb(sync)]
pub fn board_quick_add(text: String) -> BoardActionResponse {
    match with_board_service(|service| service.quick_add(&text)) {
        Ok(Ok(card)) => BoardActionResponse::success("Card created.", card.id),
        Ok(Err(err)) => BoardActionResponse::failure(format!("board_quick_add refused: {err}")),
        Err(err) => BoardActionResponse::failure(format!("board_quick_add failed: {err}")),
    }
}

/// Parses quick-add text without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn quick_add_preview(text: String) -> QuickAddPreview {
    let draft = parse_quick_add(&text);
    let columns_only = Board::new(default_columns(), Vec::new());
    let column_title = draft
        .column_hint
        .as_deref()
        .and_then(|hint| columns_only.resolve_column_hint(hint))
        .map(|column| column.title.clone());
    QuickAddPreview {
        can_submit: draft.has_title(),
        title: draft.title,
        tags: draft.tags,
        due_date: draft.due_date,
        effort: draft.effort.map(|effort| effort.to_string()),
        column_hint: draft.column_hint,
        column_title,
    }
}

fn no_move_message(reason: NoMoveReason) -> &'static str {
    match reason {
        NoMoveReason::CardNotFound => "Card not found.",
        NoMoveReason::CardArchived => "Card is archived.",
        NoMoveReason::UnknownSourceColumn => "Card is in an unknown column.",
        NoMoveReason::UnknownTargetColumn => "Column not found.",
        NoMoveReason::AtBoundary => "Card cannot move further.",
        NoMoveReason::AlreadyInColumn => "Card is already in that column.",
    }
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("FLOWBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn with_board_service<T>(
    f: impl FnOnce(&mut BoardService<SqliteCardStore<'_>>) -> T,
) -> Result<T, String> {
    let _guard = BOARD_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_board_db_path()).map_err(|err| {
        log::error!("event=ffi_board_open module=ffi status=error error={err}");
        format!("board DB open failed: {err}")
    })?;
    let store = SqliteCardStore::new(&conn, STORAGE_KEY);
    let mut service = BoardService::load(store, default_columns());
    Ok(f(&mut service))
}

fn to_column_item(column: &Column, cards: &[&Card]) -> BoardColumnItem {
    BoardColumnItem {
        column_id: column.id.clone(),
        title: column.title.clone(),
        wip_limit: column.wip_limit,
        color: column.color.clone(),
        cards: cards.iter().copied().map(to_card_item).collect(),
    }
}

fn to_card_item(card: &Card) -> BoardCardItem {
    BoardCardItem {
        card_id: card.id.clone(),
        title: card.title.clone(),
        age_epoch_ms: card.age,
        blocked: card.blocked,
        sla_risk: card.sla_risk.as_str().to_string(),
        due_date: card.due_date.clone(),
        tags: card.tags.clone(),
        effort: card.effort.map(|effort| effort.to_string()),
        today_state: card.today_state.map(|state| state.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_archive, board_duplicate, board_focus, board_move, board_move_to, board_quick_add,
        board_set_today_state, board_snapshot, board_start_next, board_toggle_blocked,
        core_version, init_logging, ping, quick_add_preview, BoardCardItem,
    };
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn quick_add_then_snapshot_shows_card_in_hinted_column() {
        use_test_db();
        let token = unique_token("snapshot");
        let created = board_quick_add(format!("{token} #ffi >done"));
        assert!(created.ok, "{}", created.message);
        let card_id = created.card_id.expect("created card should return id");

        let snapshot = board_snapshot();
        assert!(snapshot.message.is_empty(), "{}", snapshot.message);
        let done = snapshot
            .columns
            .iter()
            .find(|column| column.title == "Done")
            .expect("done column present");
        let card = done
            .cards
            .iter()
            .find(|card| card.card_id == card_id)
            .expect("created card in done column");
        assert_eq!(card.title, token);
        assert_eq!(card.tags, vec!["ffi".to_string()]);
    }

    #[test]
    fn move_past_first_column_is_reported_not_blocked() {
        use_test_db();
        let created = board_quick_add(unique_token("boundary"));
        let card_id = created.card_id.expect("created card should return id");

        let response = board_move(card_id, "prev".to_string());
        assert!(!response.ok);
        assert!(!response.wip_blocked);
        assert!(response.message.contains("cannot move further"));
    }

    #[test]
    fn move_into_full_column_reports_wip_block() {
        use_test_db();
        let created = board_quick_add(format!("{} >to", unique_token("wip")));
        let card_id = created.card_id.expect("created card should return id");

        // Seed data fills "In Progress" to its limit of 3.
        let response = board_move_to(card_id.clone(), "col-3".to_string());
        assert!(!response.ok);
        assert!(response.wip_blocked);
        assert_eq!(response.card_id.as_deref(), Some(card_id.as_str()));
        assert!(response.message.contains("WIP limit of 3"), "{}", response.message);
        assert!(response.message.contains("In Progress"));

        let card = find_card(&card_id).expect("card still on the board");
        assert_eq!(card_column(&card_id).as_deref(), Some("col-2"));
        assert!(!card.blocked);
    }

    #[test]
    fn move_to_done_then_archive_removes_from_snapshot() {
        use_test_db();
        let created = board_quick_add(unique_token("archive"));
        let card_id = created.card_id.expect("created card should return id");

        let moved = board_move_to(card_id.clone(), "col-5".to_string());
        assert!(moved.ok, "{}", moved.message);
        let archived = board_archive(card_id.clone());
        assert!(archived.ok, "{}", archived.message);

        assert!(find_card(&card_id).is_none());
    }

    #[test]
    fn toggle_blocked_round_trips() {
        use_test_db();
        let created = board_quick_add(unique_token("blocked"));
        let card_id = created.card_id.expect("created card should return id");

        assert_eq!(board_toggle_blocked(card_id.clone()).message, "Card blocked.");
        assert_eq!(board_toggle_blocked(card_id).message, "Card unblocked.");
    }

    #[test]
    fn duplicate_adds_copy_and_respects_wip() {
        use_test_db();
        let created = board_quick_add(format!("{} #dup", unique_token("dup")));
        let card_id = created.card_id.expect("created card should return id");

        let copied = board_duplicate(card_id.clone());
        assert!(copied.ok, "{}", copied.message);
        let copy_id = copied.card_id.expect("copy should return id");
        assert_ne!(copy_id, card_id);
        let copy = find_card(&copy_id).expect("copy on the board");
        assert_eq!(copy.tags, vec!["dup".to_string()]);

        let blocked = board_duplicate("card-4".to_string());
        assert!(!blocked.ok);
        assert!(blocked.wip_blocked);
        assert!(!board_duplicate("missing-card".to_string()).ok);
    }

    #[test]
    fn today_tags_toggle_and_show_in_snapshot() {
        use_test_db();
        let created = board_quick_add(unique_token("pin"));
        let card_id = created.card_id.expect("created card should return id");

        let pinned = board_set_today_state(card_id.clone(), Some("pinned".to_string()));
        assert!(pinned.ok, "{}", pinned.message);
        assert_eq!(
            find_card(&card_id).and_then(|card| card.today_state).as_deref(),
            Some("pinned")
        );

        let unpinned = board_set_today_state(card_id.clone(), Some("pinned".to_string()));
        assert_eq!(unpinned.message, "Today tag cleared.");
        assert_eq!(find_card(&card_id).and_then(|card| card.today_state), None);

        assert!(!board_set_today_state(card_id, Some("someday".to_string())).ok);
        assert!(!board_set_today_state("missing-card".to_string(), None).ok);
    }

    #[test]
    fn start_next_is_held_back_by_full_doing_column() {
        use_test_db();
        let created = board_quick_add(unique_token("queued"));
        let card_id = created.card_id.expect("created card should return id");
        assert!(board_set_today_state(card_id.clone(), Some("derived".to_string())).ok);

        let response = board_start_next();
        assert!(!response.ok);
        assert!(response.wip_blocked, "{}", response.message);
        assert_eq!(response.card_id.as_deref(), Some(card_id.as_str()));

        assert!(board_set_today_state(card_id.clone(), None).ok);
        assert_eq!(find_card(&card_id).and_then(|card| card.today_state), None);
    }

    #[test]
    fn focus_orders_column_by_risk() {
        use_test_db();
        let focus = board_focus("in".to_string());
        assert!(focus.message.is_empty(), "{}", focus.message);
        let column = &focus.columns[0];
        assert_eq!(column.title, "In Progress");
        assert_eq!(column.cards[0].sla_risk, "high");
        assert!(column
            .cards
            .windows(2)
            .all(|pair| risk_rank(&pair[0].sla_risk) >= risk_rank(&pair[1].sla_risk)));

        let missing = board_focus("later".to_string());
        assert!(missing.columns.is_empty());
        assert_eq!(missing.message, "Column not found.");
    }

    #[test]
    fn unknown_direction_and_empty_title_fail_softly() {
        use_test_db();
        assert!(!board_move("card-1".to_string(), "sideways".to_string()).ok);
        let refused = board_quick_add("#only".to_string());
        assert!(!refused.ok);
        assert!(refused.message.contains("empty"));
    }

    #[test]
    fn preview_resolves_column_title() {
        let preview = quick_add_preview("Ship it >in ^l #rel".to_string());
        assert_eq!(preview.title, "Ship it");
        assert_eq!(preview.column_title.as_deref(), Some("In Progress"));
        assert_eq!(preview.effort.as_deref(), Some("L"));
        assert!(preview.can_submit);
        assert!(!quick_add_preview(">done".to_string()).can_submit);
    }

    /// Points the FFI at a private database before its path is first resolved.
    fn use_test_db() {
        static DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
        DIR.get_or_init(|| {
            let dir = tempfile::tempdir().expect("create temp dir");
            std::env::set_var("FLOWBOARD_DB_PATH", dir.path().join("board.sqlite3"));
            dir
        });
    }

    fn find_card(card_id: &str) -> Option<BoardCardItem> {
        board_snapshot()
            .columns
            .into_iter()
            .flat_map(|column| column.cards)
            .find(|card| card.card_id == card_id)
    }

    fn card_column(card_id: &str) -> Option<String> {
        board_snapshot()
            .columns
            .into_iter()
            .find(|column| column.cards.iter().any(|card| card.card_id == card_id))
            .map(|column| column.column_id)
    }

    fn risk_rank(risk: &str) -> u8 {
        match risk {
            "high" => 2,
            "medium" => 1,
            _ => 0,
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
