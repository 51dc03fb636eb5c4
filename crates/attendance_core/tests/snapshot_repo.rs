use attendance_core::{
    compute_statistics, import_roster, AttendanceSnapshot, JsonFileRepository, PresenceSet,
    RepoError, Roster, RosterSheet, SnapshotRepository,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn temp_repo() -> (TempDir, JsonFileRepository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("data.json"));
    (dir, repo)
}

fn roster(rows: &[(&str, &str)]) -> Roster {
    let mut sheet = RosterSheet::new(["Nom", "Prénom"]);
    for (surname, given_name) in rows {
        sheet.push_row([*surname, *given_name]);
    }
    import_roster(&sheet).unwrap()
}

#[test]
fn load_without_document_returns_empty_state() {
    let (_dir, repo) = temp_repo();

    assert!(repo.try_load().unwrap().is_none());
    assert_eq!(repo.load(), AttendanceSnapshot::default());
}

#[test]
fn save_then_load_roundtrip() {
    let (_dir, repo) = temp_repo();
    let roster = roster(&[("dupont", "jean"), ("lefèvre", "élodie")]);
    let mut presence = PresenceSet::new();
    presence.mark_present("LEFÈVRE Élodie", day(2024, 3, 4));
    presence.mark_present("DUPONT Jean", day(2024, 3, 1));
    presence.mark_present("DUPONT Jean", day(2024, 2, 28));

    repo.save(Some(&roster), &presence).unwrap();
    let loaded = repo.load();

    assert_eq!(loaded.roster, Some(roster));
    assert_eq!(loaded.presence, presence);
    let keys: Vec<&str> = loaded.presence.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["LEFÈVRE Élodie", "DUPONT Jean"]);
}

#[test]
fn roundtrip_without_roster_keeps_null_marker() {
    let (_dir, repo) = temp_repo();
    let mut presence = PresenceSet::new();
    presence.mark_present("ORPHAN Key", day(2024, 1, 1));

    repo.save(None, &presence).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(repo.path()).unwrap()).unwrap();
    assert!(raw["personnel"].is_null());

    let loaded = repo.load();
    assert_eq!(loaded.roster, None);
    assert_eq!(loaded.presence, presence);
}

#[test]
fn empty_roster_roundtrips_as_empty_list() {
    let (_dir, repo) = temp_repo();
    let empty = Roster::default();

    repo.save(Some(&empty), &PresenceSet::new()).unwrap();
    assert_eq!(repo.load().roster, Some(empty));
}

#[test]
fn document_uses_expected_wire_shape() {
    let (_dir, repo) = temp_repo();
    let roster = roster(&[(" dupont ", "JEAN")]);
    let mut presence = PresenceSet::new();
    presence.mark_present("DUPONT Jean", day(2024, 3, 5));
    presence.mark_present("DUPONT Jean", day(2024, 3, 1));

    repo.save(Some(&roster), &presence).unwrap();
    let text = std::fs::read_to_string(repo.path()).unwrap();
    assert!(text.contains("Prénom"), "non-ASCII should stay literal: {text}");

    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "personnel": [{ "Nom": "DUPONT", "Prénom": "Jean" }],
            "presence": { "DUPONT Jean": ["2024-03-01", "2024-03-05"] }
        })
    );
}

#[test]
fn save_overwrites_previous_document() {
    let (_dir, repo) = temp_repo();
    let mut presence = PresenceSet::new();
    presence.mark_present("DUPONT Jean", day(2024, 3, 1));
    repo.save(None, &presence).unwrap();

    let roster = roster(&[("martin", "paul")]);
    repo.save(Some(&roster), &PresenceSet::new()).unwrap();

    let loaded = repo.load();
    assert_eq!(loaded.roster, Some(roster));
    assert!(loaded.presence.is_empty());
}

#[test]
fn save_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("nested").join("state").join("data.json");
    let repo = JsonFileRepository::new(&path);

    repo.save(None, &PresenceSet::new()).unwrap();
    assert!(path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "temp files must not linger: {leftovers:?}");
}

#[test]
fn clear_removes_document_and_is_idempotent() {
    let (_dir, repo) = temp_repo();
    let roster = roster(&[("dupont", "jean")]);
    let mut presence = PresenceSet::new();
    presence.mark_present("DUPONT Jean", day(2024, 3, 1));
    repo.save(Some(&roster), &presence).unwrap();

    let reset = repo.clear().unwrap();
    assert_eq!(reset, AttendanceSnapshot::default());
    assert!(!repo.path().exists());
    assert!(repo.clear().is_ok());

    let reloaded = repo.load();
    assert_eq!(reloaded.roster, None);
    assert!(compute_statistics(&reloaded.presence).is_empty());
}

#[test]
fn malformed_documents_degrade_to_empty_state() {
    let cases = [
        "",
        "{\"personnel\": null, \"presence\": {\"DUPONT Jean\": [\"2024-03-",
        "not json at all",
        "{\"presence\": {}}",
        "{\"personnel\": null}",
        "{\"personnel\": null, \"presence\": {\"DUPONT Jean\": [\"01/03/2024\"]}}",
        "{\"personnel\": [{\"Nom\": \"DUPONT\"}], \"presence\": {}}",
        "[]",
    ];

    for contents in cases {
        let (_dir, repo) = temp_repo();
        std::fs::write(repo.path(), contents).unwrap();

        assert!(
            matches!(repo.try_load(), Err(RepoError::Corrupted(_))),
            "strict load should flag: {contents}"
        );
        assert_eq!(
            repo.load(),
            AttendanceSnapshot::default(),
            "lenient load should degrade: {contents}"
        );
    }
}

#[test]
fn unknown_presence_keys_are_kept() {
    let (_dir, repo) = temp_repo();
    std::fs::write(
        repo.path(),
        r#"{"personnel": [{"Nom": "DUPONT", "Prénom": "Jean"}],
            "presence": {"GHOST Someone": ["2024-03-01", "2024-03-01"]},
            "version": 2}"#,
    )
    .unwrap();

    let loaded = repo.load();
    assert_eq!(loaded.roster.unwrap().display_keys(), vec!["DUPONT Jean"]);
    assert_eq!(loaded.presence.present_dates("GHOST Someone").len(), 1);
}

#[test]
fn corruption_message_does_not_echo_document_content() {
    let documents = [
        r#"{"personnel": "DUPONT Jean", "presence": {}}"#,
        r#"{"personnel": [{"Nom": 7, "Prénom": "Jean"}], "presence": {"DUPONT Jean": []}}"#,
        r#"{"personnel": null, "presence": {"DUPONT Jean": ["DUPONT"]}}"#,
    ];

    for contents in documents {
        let (_dir, repo) = temp_repo();
        std::fs::write(repo.path(), contents).unwrap();

        let err = repo.try_load().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, RepoError::Corrupted(_)));
        assert!(!message.contains("DUPONT"), "leaked content: {message}");
        assert!(!message.contains("Jean"), "leaked content: {message}");
        assert!(message.contains("line 1"), "missing position: {message}");
    }
}

#[test]
fn concurrent_saves_never_expose_a_partial_document() {
    let (dir, repo) = temp_repo();
    let states: Vec<PresenceSet> = (0..4)
        .map(|writer| {
            let mut presence = PresenceSet::new();
            for d in 1..=28 {
                presence.mark_present(&format!("WRITER{writer} Person"), day(2024, 2, d));
            }
            presence
        })
        .collect();
    repo.save(None, &states[0]).unwrap();

    let states = &states;
    std::thread::scope(|scope| {
        for state in states {
            let writer = repo.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    writer.save(None, state).unwrap();
                }
            });
        }

        let reader = repo.clone();
        scope.spawn(move || {
            for _ in 0..200 {
                let snapshot = reader
                    .try_load()
                    .expect("read during writes must decode")
                    .expect("document must stay present");
                assert!(snapshot.roster.is_none());
                assert!(states.contains(&snapshot.presence));
            }
        });
    });

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("data.json")]);
    assert!(states.contains(&repo.load().presence));
}
