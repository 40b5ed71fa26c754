//! End-to-end board scenarios against a real board directory: the session
//! reads cards from disk, persists view state into board.toml, and rewrites
//! card front matter through `CardStore`.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;

use cardboard::io::card_io::{self, CardStore};
use cardboard::io::config_io::{ConfigStore, TomlConfigStore, CARD_ORDER_KEY};
use cardboard::io::project_io;
use cardboard::model::card::Card;
use cardboard::model::record::GroupField;
use cardboard::ops::drag::Placement;
use cardboard::ops::drop_ops::column_paths;
use cardboard::ops::session::{BoardSession, DropOutcome};

type Session = BoardSession<Card, TomlConfigStore>;

fn write_card(root: &Path, name: &str, text: &str) {
    let path = root.join("board/cards").join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn open(root: &Path) -> Session {
    let board = project_io::load_board(root).unwrap();
    let field = GroupField::new(&board.config.board.group_by);
    let groups = card_io::query_groups(&board.cards, &field);
    let mut session = BoardSession::new(TomlConfigStore::open(&board.board_dir).unwrap(), field);
    session.refresh(groups);
    session
}

/// Reload cards from disk into an existing session
fn reload(root: &Path, session: &mut Session) {
    let board = project_io::load_board(root).unwrap();
    let groups = card_io::query_groups(&board.cards, session.group_field());
    session.refresh(groups);
}

fn sample_board() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    project_io::init_board(tmp.path(), "scenarios", "note.status", false).unwrap();
    write_card(tmp.path(), "x.md", "+++\nstatus = \"A\"\n+++\n# X\n");
    write_card(tmp.path(), "y.md", "+++\nstatus = \"A\"\n+++\n# Y\n");
    write_card(tmp.path(), "z.md", "+++\nstatus = \"B\"\n+++\n# Z\n");
    tmp
}

#[test]
fn cross_column_drop_survives_reload() {
    let tmp = sample_board();
    let mut session = open(tmp.path());
    let mut cards = CardStore::new(&tmp.path().join("board/cards"));

    session.start_card_drag("x.md").unwrap();
    let outcome = session
        .drop_card(&mut cards, &json!("B"), Some("z.md"), Some(Placement::Before))
        .unwrap();
    assert_eq!(
        outcome,
        DropOutcome::Cards {
            moved: vec!["x.md".into()],
            rewritten: vec!["x.md".into()],
        }
    );

    // A fresh session sees the rewritten card and the persisted order
    let session = open(tmp.path());
    assert_eq!(column_paths(session.groups(), "A"), vec!["y.md"]);
    assert_eq!(column_paths(session.groups(), "B"), vec!["x.md", "z.md"]);
}

#[test]
fn confirmed_refresh_keeps_selection_of_surviving_cards() {
    let tmp = sample_board();
    let mut session = open(tmp.path());
    session.select("x.md", false);
    session.select("z.md", true);
    assert_eq!(session.selection().len(), 3);

    fs::remove_file(tmp.path().join("board/cards/y.md")).unwrap();
    reload(tmp.path(), &mut session);

    let selected: Vec<&str> = session.selection().paths().collect();
    assert_eq!(selected, vec!["x.md", "z.md"]);
    assert_eq!(session.board_order(), ["x.md", "z.md"]);
}

#[test]
fn numeric_and_string_values_share_a_column() {
    let tmp = tempfile::TempDir::new().unwrap();
    project_io::init_board(tmp.path(), "prio", "priority", false).unwrap();
    write_card(tmp.path(), "a.md", "+++\npriority = 1\n+++\n# A\n");
    write_card(tmp.path(), "b.md", "+++\npriority = \"1\"\n+++\n# B\n");
    write_card(tmp.path(), "c.md", "+++\npriority = 2\n+++\n# C\n");

    let mut session = open(tmp.path());
    assert_eq!(session.column_keys(), vec!["1", "2"]);
    assert_eq!(column_paths(session.groups(), "1"), vec!["a.md", "b.md"]);

    // The merged column keeps the first value it saw: the integer
    let mut cards = CardStore::new(&tmp.path().join("board/cards"));
    let key = session.groups()[0].key.clone();
    session.start_card_drag("c.md").unwrap();
    session.drop_card(&mut cards, &key, None, None).unwrap();
    let text = fs::read_to_string(tmp.path().join("board/cards/c.md")).unwrap();
    assert!(text.contains("priority = 1\n"), "got: {}", text);
}

#[test]
fn cards_in_subfolders_group_by_folder() {
    let tmp = tempfile::TempDir::new().unwrap();
    project_io::init_board(tmp.path(), "folders", "file.folder", false).unwrap();
    write_card(tmp.path(), "inbox/one.md", "# One\n");
    write_card(tmp.path(), "later/two.md", "# Two\n");
    write_card(tmp.path(), "loose.md", "# Loose\n");

    let session = open(tmp.path());
    assert_eq!(session.column_keys(), vec!["inbox", "later", "__no_value__"]);
    assert_eq!(
        column_paths(session.groups(), "__no_value__"),
        vec!["loose.md"]
    );
}

#[test]
fn stale_card_order_entries_are_ignored() {
    let tmp = sample_board();
    let mut store = TomlConfigStore::open(&tmp.path().join("board")).unwrap();
    store
        .set(CARD_ORDER_KEY, r#"{"A":["gone.md","y.md","y.md"],"B":[]}"#)
        .unwrap();

    let session = open(tmp.path());
    assert_eq!(column_paths(session.groups(), "A"), vec!["x.md", "y.md"]);
    assert_eq!(column_paths(session.groups(), "B"), vec!["z.md"]);
}

#[test]
fn column_drag_and_reset_round_trip_through_board_toml() {
    let tmp = sample_board();
    let mut session = open(tmp.path());

    session.start_column_drag("B").unwrap();
    session.drop_column("A", Placement::Before).unwrap();
    assert_eq!(open(tmp.path()).column_keys(), vec!["B", "A"]);

    session.reset_column_order().unwrap();
    assert_eq!(open(tmp.path()).column_keys(), vec!["A", "B"]);
}
