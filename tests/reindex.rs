use std::fs;

use ted::query::ListOptions;
use ted::{Error, Root};

mod support;

#[test]
fn deleted_record_file_drops_out_after_reindex() {
    let dir = support::TestDir::init();
    dir.create("keep", "1", &[]);
    dir.create("gone", "1", &[]);
    dir.remove_file(Root::Active, "2");

    // The cache still lists it until reindexed.
    assert!(dir.db().exists(2, Root::Active).unwrap());

    dir.db().reindex().unwrap();
    assert!(!dir.db().exists(2, Root::Active).unwrap());
    assert_eq!(dir.index_keys(Root::Active), dir.record_names(Root::Active));
}

#[test]
fn hand_written_records_are_picked_up() {
    let dir = support::TestDir::init();
    dir.write_file(Root::Active, "3", "Water plants\n\n4 home\n\nferns first");
    dir.write_file(Root::Archive, "1", "Old thing\n\n2\n\n");
    dir.write_file(Root::Active, ".3.swp", "editor junk");

    let report = dir.db().reindex().unwrap();
    assert_eq!(report.active, 1);
    assert_eq!(report.archive, 1);

    assert_eq!(dir.index_keys(Root::Active), vec!["3"]);
    assert_eq!(dir.index_keys(Root::Archive), vec!["1"]);
    let tasks = dir.db().list(&ListOptions::default(), Root::Active).unwrap();
    assert_eq!(tasks[0].title, "Water plants");
    assert_eq!(tasks[0].tags, vec!["home"]);
}

#[test]
fn corrupt_index_is_fatal_until_reindex() {
    let dir = support::TestDir::init();
    dir.create("a", "1", &["x"]);
    let index_file = dir.db().storage().index_file(Root::Active);
    fs::write(&index_file, "{\"1\": {\"title\": ").unwrap();

    let err = dir
        .db()
        .list(&ListOptions::default(), Root::Active)
        .unwrap_err();
    assert!(matches!(err, Error::CorruptIndex { .. }));

    dir.db().reindex().unwrap();
    let tasks = dir.db().list(&ListOptions::default(), Root::Active).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].tags, vec!["x"]);
}

#[test]
fn reindex_converges_for_both_roots() {
    let dir = support::TestDir::init();
    for title in ["a", "b", "c", "d"] {
        dir.create(title, "1", &[]);
    }
    dir.db().archive(2).unwrap();
    dir.db().archive(4).unwrap();
    dir.remove_file(Root::Archive, "4");
    dir.write_file(Root::Active, "9", "manual\n\n1\n\n");

    dir.db().reindex().unwrap();
    for root in [Root::Active, Root::Archive] {
        assert_eq!(dir.index_keys(root), dir.record_names(root), "{root}");
    }
    assert_eq!(dir.index_keys(Root::Active), vec!["1", "3", "9"]);
    assert_eq!(dir.index_keys(Root::Archive), vec!["2"]);
}

#[test]
fn reindex_keeps_malformed_records() {
    let dir = support::TestDir::init();
    dir.write_file(Root::Active, "1", "title only");

    dir.db().reindex().unwrap();
    let tasks = dir.db().list(&ListOptions::default(), Root::Active).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "title only");
    assert_eq!(tasks[0].pri, "");
}

#[test]
fn reindex_survives_non_utf8_record() {
    let dir = support::TestDir::init();
    dir.create("valid", "3", &["x"]);
    fs::write(dir.root_dir(Root::Active).join("2"), b"caf\xe9\n\n1 y\n\n").unwrap();

    let report = dir.db().reindex().unwrap();
    assert_eq!(report.active, 2);

    let tasks = dir.db().list(&ListOptions::default(), Root::Active).unwrap();
    assert_eq!(tasks[0].id, "1");
    assert_eq!(tasks[1].title, "caf\u{fffd}");
    assert_eq!(tasks[1].tags, vec!["y"]);

    // The record stays readable and movable.
    assert_eq!(dir.db().read(2, Root::Active).unwrap().pri, "1");
    assert!(dir.db().archive(2).unwrap());
}
