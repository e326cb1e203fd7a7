use mom_notes::db::{is_constraint_violation, Database, DashboardQuery, NoteQuery, ShareQuery, Sort, VersionQuery};
use mom_notes::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_dashboard(db: &Database, owner: &str, name: &str) -> Dashboard {
    db.create_dashboard(NewDashboard {
        name: name.to_string(),
        owner_email: owner.to_string(),
    })
    .expect("Failed to create dashboard")
}

fn create_test_note(db: &Database, dashboard_id: Uuid, content: &str, symbol: Symbol) -> Note {
    db.create_note(NewNote {
        dashboard_id,
        content: content.to_string(),
        symbol,
    })
    .expect("Failed to create note")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "open" {
        it "creates the parent directory for an on-disk database" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("notes.db");

            let on_disk = Database::open(path.clone()).expect("Failed to open");
            on_disk.migrate().expect("Failed to migrate");
            create_test_dashboard(&on_disk, "alice@x.com", "Persisted");

            let reopened = Database::open(path).expect("Failed to reopen");
            reopened.migrate().expect("Migrations should be idempotent");
            let dashboards = reopened
                .filter_dashboards(&DashboardQuery::default(), None, None)
                .expect("Query failed");
            assert_eq!(dashboards.len(), 1);
            assert_eq!(dashboards[0].name, "Persisted");
        }
    }

    describe "sessions" {
        it "round-trips a session by token" {
            let user = User {
                email: "alice@x.com".to_string(),
                full_name: "Alice".to_string(),
            };
            let session = db.create_session(&user).expect("Failed to create session");

            let found = db.get_session(session.token).expect("Query failed").expect("Missing session");
            assert_eq!(found.user, user);
            assert_eq!(found.started_at, session.started_at);
        }

        it "forgets a deleted session" {
            let user = User {
                email: "alice@x.com".to_string(),
                full_name: "Alice".to_string(),
            };
            let session = db.create_session(&user).unwrap();

            assert!(db.delete_session(session.token).unwrap());
            assert!(db.get_session(session.token).unwrap().is_none());
            assert!(!db.delete_session(session.token).unwrap());
        }
    }

    describe "dashboards" {
        it "returns None for a missing dashboard" {
            assert!(db.get_dashboard(Uuid::new_v4()).expect("Query failed").is_none());
            assert!(db.update_dashboard(Uuid::new_v4(), "x").expect("Query failed").is_none());
            assert!(!db.delete_dashboard(Uuid::new_v4()).expect("Query failed"));
        }

        it "filters by owner and sorts by the requested field" {
            create_test_dashboard(&db, "alice@x.com", "Beta");
            create_test_dashboard(&db, "bob@x.com", "Gamma");
            create_test_dashboard(&db, "alice@x.com", "Alpha");

            let alices = db
                .filter_dashboards(
                    &DashboardQuery { owner_email: Some("alice@x.com".to_string()) },
                    Sort::parse("name").as_ref(),
                    None,
                )
                .expect("Query failed");
            let names: Vec<&str> = alices.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["Alpha", "Beta"]);
        }

        it "sorts descending with a leading dash and honours the limit" {
            create_test_dashboard(&db, "alice@x.com", "First");
            create_test_dashboard(&db, "alice@x.com", "Second");
            create_test_dashboard(&db, "alice@x.com", "Third");

            let newest = db
                .filter_dashboards(&DashboardQuery::default(), Sort::parse("-created_date").as_ref(), Some(2))
                .expect("Query failed");
            let names: Vec<&str> = newest.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["Third", "Second"]);
        }

        it "rejects sorting on an unknown field" {
            let result = db.filter_dashboards(&DashboardQuery::default(), Some(&Sort::asc("owner_email; --")), None);
            assert!(result.is_err());
        }

        it "keeps the owner when renaming" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Old");
            let renamed = db.update_dashboard(dashboard.id, "New").unwrap().unwrap();

            assert_eq!(renamed.name, "New");
            assert_eq!(renamed.owner_email, "alice@x.com");
            assert_eq!(renamed.created_date, dashboard.created_date);
            assert_eq!(db.get_dashboard(dashboard.id).unwrap().unwrap().name, "New");
        }
    }

    describe "shares" {
        it "enforces one share per dashboard and email" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Shared");
            db.create_share(NewShare {
                dashboard_id: dashboard.id,
                shared_with_email: "bob@x.com".to_string(),
                permission_level: ShareLevel::Viewer,
            })
            .expect("Failed to create share");

            let err = db
                .create_share(NewShare {
                    dashboard_id: dashboard.id,
                    shared_with_email: "bob@x.com".to_string(),
                    permission_level: ShareLevel::Editor,
                })
                .expect_err("Duplicate share should fail");
            assert!(is_constraint_violation(&err));
        }

        it "filters by dashboard, email and level" {
            let first = create_test_dashboard(&db, "alice@x.com", "First");
            let second = create_test_dashboard(&db, "alice@x.com", "Second");
            for (dashboard, email, level) in [
                (&first, "bob@x.com", ShareLevel::Viewer),
                (&first, "carol@x.com", ShareLevel::Editor),
                (&second, "bob@x.com", ShareLevel::Editor),
            ] {
                db.create_share(NewShare {
                    dashboard_id: dashboard.id,
                    shared_with_email: email.to_string(),
                    permission_level: level,
                })
                .unwrap();
            }

            let bobs = db
                .filter_shares(&ShareQuery { shared_with_email: Some("bob@x.com".to_string()), ..Default::default() }, None, None)
                .unwrap();
            assert_eq!(bobs.len(), 2);

            let editors_on_first = db
                .filter_shares(
                    &ShareQuery {
                        dashboard_id: Some(first.id),
                        permission_level: Some(ShareLevel::Editor),
                        ..Default::default()
                    },
                    None,
                    None,
                )
                .unwrap();
            assert_eq!(editors_on_first.len(), 1);
            assert_eq!(editors_on_first[0].shared_with_email, "carol@x.com");
        }

        it "returns None when updating a share that is gone" {
            assert!(db.update_share(Uuid::new_v4(), ShareLevel::Editor).unwrap().is_none());
        }

        it "updates the permission level" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Shared");
            let share = db
                .create_share(NewShare {
                    dashboard_id: dashboard.id,
                    shared_with_email: "bob@x.com".to_string(),
                    permission_level: ShareLevel::Viewer,
                })
                .unwrap();

            let updated = db.update_share(share.id, ShareLevel::Editor).unwrap().unwrap();
            assert_eq!(updated.permission_level, ShareLevel::Editor);
            assert_eq!(db.get_share(share.id).unwrap().unwrap().permission_level, ShareLevel::Editor);
        }
    }

    describe "notes" {
        it "filters by symbol" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            create_test_note(&db, dashboard.id, "goal", Symbol::Goal);
            create_test_note(&db, dashboard.id, "budget", Symbol::Budget);

            let budgets = db
                .filter_notes(&NoteQuery { symbol: Some(Symbol::Budget), ..Default::default() }, None, None)
                .unwrap();
            assert_eq!(budgets.len(), 1);
            assert_eq!(budgets[0].content, "budget");
            assert_eq!(budgets[0].symbol, Symbol::Budget);
        }

        it "lists notes across dashboards" {
            let first = create_test_dashboard(&db, "alice@x.com", "First");
            let second = create_test_dashboard(&db, "bob@x.com", "Second");
            create_test_note(&db, first.id, "a", Symbol::Goal);
            create_test_note(&db, second.id, "b", Symbol::Goal);

            let all = db.list_notes(Some(&Sort::desc("created_date"))).unwrap();
            let contents: Vec<&str> = all.iter().map(|n| n.content.as_str()).collect();
            assert_eq!(contents, vec!["b", "a"]);
        }

        it "writes a note and its first version together" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            let (note, version) = db
                .create_note_with_version(NewNote {
                    dashboard_id: dashboard.id,
                    content: "first".to_string(),
                    symbol: Symbol::Goal,
                })
                .expect("Failed to create note");

            assert_eq!(version.note_id, note.id);
            assert_eq!(version.content, "first");
            assert_eq!(db.filter_versions(&VersionQuery { note_id: Some(note.id) }, None, None).unwrap().len(), 1);
        }

        it "writes nothing when updating a note that is gone" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            let note = create_test_note(&db, dashboard.id, "draft", Symbol::Goal);
            assert!(db.delete_note(note.id).unwrap());

            let changes = || NoteChanges { content: "late".to_string(), symbol: Symbol::Goal };
            assert!(db.update_note(note.id, changes()).unwrap().is_none());
            assert!(db.update_note_with_version(note.id, changes()).unwrap().is_none());
            assert!(db.filter_versions(&VersionQuery { note_id: Some(note.id) }, None, None).unwrap().is_empty());
        }

        it "appends a version with each transactional update" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            let note = create_test_note(&db, dashboard.id, "draft", Symbol::Goal);

            let (updated, version) = db
                .update_note_with_version(note.id, NoteChanges { content: "final".to_string(), symbol: Symbol::Budget })
                .unwrap()
                .expect("Note should exist");
            assert_eq!(updated.content, "final");
            assert_eq!(updated.created_date, note.created_date);
            assert_eq!(version.symbol, Symbol::Budget);
        }

        it "deletes a note with its versions and reports the count" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            let note = create_test_note(&db, dashboard.id, "draft", Symbol::Goal);
            for content in ["one", "two"] {
                db.create_version(NewNoteVersion { note_id: note.id, content: content.to_string(), symbol: Symbol::Goal })
                    .unwrap();
            }

            assert_eq!(db.delete_note_with_versions(note.id).unwrap(), Some(2));
            assert!(db.get_note(note.id).unwrap().is_none());
            assert!(db.find_orphans().unwrap().is_empty());
            assert_eq!(db.delete_note_with_versions(note.id).unwrap(), None);
        }

        it "stores symbols with variation selectors intact" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Notes");
            let note = create_test_note(&db, dashboard.id, "workaround", Symbol::Workaround);

            assert_eq!(db.get_note(note.id).unwrap().unwrap().symbol, Symbol::Workaround);
        }
    }

    describe "versions" {
        it "returns versions newest first" {
            let note_id = Uuid::new_v4();
            for content in ["one", "two", "three"] {
                db.create_version(NewNoteVersion {
                    note_id,
                    content: content.to_string(),
                    symbol: Symbol::Goal,
                })
                .unwrap();
            }

            let versions = db
                .filter_versions(&VersionQuery { note_id: Some(note_id) }, Some(&Sort::desc("created_date")), None)
                .unwrap();
            let contents: Vec<&str> = versions.iter().map(|v| v.content.as_str()).collect();
            assert_eq!(contents, vec!["three", "two", "one"]);
        }
    }

    describe "find_orphans" {
        it "finds records whose parent is gone" {
            let dashboard = create_test_dashboard(&db, "alice@x.com", "Doomed");
            let note = create_test_note(&db, dashboard.id, "left behind", Symbol::Goal);
            let version = db
                .create_version(NewNoteVersion {
                    note_id: note.id,
                    content: note.content.clone(),
                    symbol: note.symbol,
                })
                .unwrap();
            let share = db
                .create_share(NewShare {
                    dashboard_id: dashboard.id,
                    shared_with_email: "bob@x.com".to_string(),
                    permission_level: ShareLevel::Viewer,
                })
                .unwrap();

            assert!(db.find_orphans().unwrap().is_empty());

            db.delete_dashboard(dashboard.id).unwrap();
            let orphans = db.find_orphans().unwrap();
            assert_eq!(orphans.notes, vec![note.id]);
            assert_eq!(orphans.shares, vec![share.id]);
            assert!(orphans.versions.is_empty());

            db.delete_note(note.id).unwrap();
            assert_eq!(db.find_orphans().unwrap().versions, vec![version.id]);
        }
    }
}
