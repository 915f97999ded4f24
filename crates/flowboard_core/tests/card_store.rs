use chrono::{TimeZone, Utc};
use flowboard_core::db::{open_db, open_db_in_memory};
use flowboard_core::{
    default_cards, default_columns, BoardService, BoardServiceError, Card, CardStore, Direction,
    DuplicateOutcome, Effort, MoveOutcome, SqliteCardStore, StoreError, TodayState, STORAGE_KEY,
};

#[test]
fn empty_store_loads_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCardStore::new(&conn, STORAGE_KEY);

    assert!(store.load_cards().unwrap().is_none());
}

#[test]
fn save_then_load_returns_same_cards() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCardStore::new(&conn, STORAGE_KEY);
    let cards = default_cards(1_700_000_000_000);

    store.save_cards(&cards).unwrap();
    assert_eq!(store.load_cards().unwrap(), Some(cards.clone()));

    let trimmed = &cards[..2];
    store.save_cards(trimmed).unwrap();
    assert_eq!(store.load_cards().unwrap().unwrap(), trimmed.to_vec());
}

#[test]
fn storage_keys_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let main = SqliteCardStore::new(&conn, "main");
    let other = SqliteCardStore::new(&conn, "other");

    main.save_cards(&[Card::with_id("x", "t", "col-1", 0)]).unwrap();
    assert!(other.load_cards().unwrap().is_none());
    assert_eq!(main.storage_key(), "main");
}

#[test]
fn corrupt_payload_is_reported_as_payload_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO board_state (storage_key, payload) VALUES (?1, 'not json');",
        [STORAGE_KEY],
    )
    .unwrap();
    let store = SqliteCardStore::new(&conn, STORAGE_KEY);

    let err = store.load_cards().unwrap_err();
    assert!(matches!(err, StoreError::Payload(_)));
}

#[test]
fn service_falls_back_to_seed_cards_on_corrupt_payload() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO board_state (storage_key, payload) VALUES (?1, '{\"broken\": true}');",
        [STORAGE_KEY],
    )
    .unwrap();

    let service = BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
    assert_eq!(service.board().cards().len(), 11);
    assert!(service.board().card("card-1").is_some());
}

#[test]
fn service_persists_moves_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    {
        let conn = open_db(&path).unwrap();
        let mut service =
            BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
        assert!(service.move_to("card-1", "col-5").is_moved());
        assert!(service.archive("card-8"));
    }

    let conn = open_db(&path).unwrap();
    let service = BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
    let board = service.board();
    assert_eq!(board.card("card-1").unwrap().column_id, "col-5");
    assert!(board.card("card-8").unwrap().is_archived);
    assert!(board.group_by_column()["col-1"].is_empty());
}

#[test]
fn service_blocked_move_reports_wip_and_keeps_store() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());

    // Seed data fills "In Progress" to its limit of 3.
    match service.move_relative("card-5", Direction::Next) {
        MoveOutcome::Blocked(blocked) => {
            assert_eq!(blocked.column_id, "col-3");
            assert_eq!(blocked.limit, 3);
        }
        other => panic!("expected blocked move, got {other:?}"),
    }
    let store = SqliteCardStore::new(&conn, STORAGE_KEY);
    assert!(store.load_cards().unwrap().is_none());
}

#[test]
fn quick_add_resolves_hint_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
    let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();

    let card = service
        .quick_add_at("Write changelog #docs ^s >rev", now)
        .unwrap();
    assert_eq!(card.title, "Write changelog");
    assert_eq!(card.column_id, "col-4");
    assert_eq!(card.effort, Some(Effort::S));

    let stored = SqliteCardStore::new(&conn, STORAGE_KEY)
        .load_cards()
        .unwrap()
        .unwrap();
    assert!(stored.iter().any(|stored| stored.id == card.id));
}

#[test]
fn quick_add_with_unknown_hint_uses_first_column() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());

    let card = service.quick_add("Someday idea >later").unwrap();
    assert_eq!(card.column_id, "col-1");
}

#[test]
fn quick_add_refuses_empty_title() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
    let before = service.board().cards().len();

    assert_eq!(
        service.quick_add("#only ^m !today").unwrap_err(),
        BoardServiceError::EmptyTitle
    );
    assert_eq!(service.board().cards().len(), before);
}

#[test]
fn duplicate_respects_wip_and_persists_copy() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());

    // "In Progress" is already at its limit of 3.
    assert!(matches!(
        service.duplicate("card-4"),
        DuplicateOutcome::Blocked(_)
    ));

    let DuplicateOutcome::Created(copy) = service.duplicate("card-1") else {
        panic!("backlog has no WIP limit");
    };
    assert_eq!(copy.column_id, "col-1");
    assert_eq!(copy.title, "Design the new login flow");

    let stored = SqliteCardStore::new(&conn, STORAGE_KEY)
        .load_cards()
        .unwrap()
        .unwrap();
    assert_eq!(stored.len(), 12);
    assert!(stored.iter().any(|card| card.id == copy.id));
}

#[test]
fn queued_card_starts_once_doing_has_room() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("today.db");

    {
        let conn = open_db(&path).unwrap();
        let mut service =
            BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
        assert_eq!(
            service.toggle_today_state("card-5", TodayState::Derived),
            Some(true)
        );
        assert_eq!(
            service.toggle_today_state("card-8", TodayState::Pinned),
            Some(true)
        );
        assert!(service.start_next().is_blocked());
    }

    let conn = open_db(&path).unwrap();
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());
    let plan = service.board().today_plan();
    assert_eq!(plan.pinned.len(), 1);
    assert_eq!(plan.derived[0].id, "card-5");

    assert!(service.archive("card-4"));
    assert!(service.start_next().is_moved());
    assert_eq!(service.board().card("card-5").unwrap().column_id, "col-3");
}
