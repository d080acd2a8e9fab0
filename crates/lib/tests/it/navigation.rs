//! Review flow transition tests

use std::sync::Arc;

use feline::{
    Error,
    auth::UserId,
    navigation::{NavigationError, Transition},
    session::{Location, Page, ReviewMethod, SessionStore},
};

use crate::helpers::*;

// ===== FILE SELECTION TESTS =====

#[tokio::test]
async fn test_start_lists_files() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");

    let transition = nav.start(&mut session).await.unwrap();

    assert_eq!(transition, Transition::Moved(Location::FileSelect));
    assert_eq!(session.location(), Location::FileSelect);
    assert_eq!(
        session.page(),
        &Page::FileSelect {
            files: vec!["hamlet".to_string(), "macbeth".to_string()]
        }
    );
    assert_eq!(
        engine.calls(),
        vec![Call::ListFiles {
            user: "rustum".to_string()
        }]
    );
}

#[tokio::test]
async fn test_select_file_moves_to_settings() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();

    let transition = nav.select_file(&mut session, "1").await.unwrap();

    assert_eq!(transition, Transition::Moved(Location::Settings));
    assert_eq!(session.selected_file(), Some("macbeth"));
    assert_eq!(
        session.page(),
        &Page::Settings {
            options: ReviewMethod::ALL.to_vec()
        }
    );
}

#[tokio::test]
async fn test_bad_selection_indices_are_rejected_without_mutation() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();
    let before = session.page().clone();

    for raw in ["5", "2", "-1", "one", "", "1.0"] {
        let err = nav.select_file(&mut session, raw).await.unwrap_err();
        match err {
            Error::Navigation(NavigationError::InvalidSelection { input, available }) => {
                assert_eq!(input, raw);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error for {raw:?}: {other:?}"),
        }
        assert_eq!(session.location(), Location::FileSelect);
        assert_eq!(session.selected_file(), None);
        assert_eq!(session.page(), &before);
    }
}

#[tokio::test]
async fn test_selection_index_tolerates_whitespace() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine, dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();

    nav.select_file(&mut session, " 0 ").await.unwrap();
    assert_eq!(session.selected_file(), Some("hamlet"));
}

// ===== REVIEW METHOD TESTS =====

#[tokio::test]
async fn test_choose_review_method_fetches_lines() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("calcifer");
    nav.start(&mut session).await.unwrap();
    nav.select_file(&mut session, "0").await.unwrap();
    engine.clear_calls();

    let transition = nav
        .choose_review_method(&mut session, "no_cues")
        .await
        .unwrap();

    assert_eq!(transition, Transition::Moved(Location::LineReviewer));
    assert_eq!(
        session.page(),
        &Page::LineReviewer {
            lines: sample_lines("hamlet"),
            review_method: ReviewMethod::NoCues,
        }
    );
    assert_eq!(
        engine.calls(),
        vec![Call::FetchLines {
            user: "calcifer".to_string(),
            file: "hamlet".to_string()
        }]
    );
    assert!(session.is_reviewing());
}

#[tokio::test]
async fn test_empty_or_unknown_review_method_is_client_error() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();
    nav.select_file(&mut session, "0").await.unwrap();
    engine.clear_calls();

    for raw in ["", "backwards"] {
        let err = nav.choose_review_method(&mut session, raw).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(session.location(), Location::Settings);
    }
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_garbled_lines_fail_without_moving() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();
    nav.select_file(&mut session, "0").await.unwrap();
    engine.garble_lines();

    let err = nav
        .choose_review_method(&mut session, "random")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Engine(ref e) if e.is_protocol_error()));
    assert!(!err.is_client_error());
    assert_eq!(session.location(), Location::Settings);
    assert_eq!(session.selected_file(), Some("hamlet"));
}

#[tokio::test]
async fn test_engine_failure_on_start_keeps_current_page() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();
    nav.select_file(&mut session, "0").await.unwrap();
    engine.reject_list_files("storage offline");

    let err = nav.start(&mut session).await.unwrap_err();

    assert_eq!(err.engine_diagnostic(), Some("storage offline"));
    assert_eq!(session.location(), Location::Settings);
}

// ===== STALE LOCATION TESTS =====

#[tokio::test]
async fn test_location_bound_operations_are_stale_elsewhere() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = reviewing_session(&nav, "rustum", "1").await;
    engine.clear_calls();
    let page_before = session.page().clone();

    assert_eq!(
        nav.select_file(&mut session, "0").await.unwrap(),
        Transition::Stale(Location::LineReviewer)
    );
    assert_eq!(
        nav.choose_review_method(&mut session, "random")
            .await
            .unwrap(),
        Transition::Stale(Location::LineReviewer)
    );

    assert_eq!(session.location(), Location::LineReviewer);
    assert_eq!(session.selected_file(), Some("macbeth"));
    assert_eq!(session.page(), &page_before);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_stale_from_unset() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");

    assert!(nav.select_file(&mut session, "0").await.unwrap().is_stale());
    assert!(
        nav.choose_review_method(&mut session, "in_order")
            .await
            .unwrap()
            .is_stale()
    );
    assert!(nav.finish(&mut session).is_stale());
    assert_eq!(session.location(), Location::Unset);
    assert_eq!(session.selected_file(), None);
    assert!(engine.calls().is_empty());
}

// ===== LINE REVIEWER TESTS =====

#[tokio::test]
async fn test_star_line_forwards_and_refreshes() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = reviewing_session(&nav, "rustum", "0").await;
    engine.clear_calls();

    nav.star_line(&mut session, 2, true).await.unwrap();

    assert_eq!(
        engine.calls()[0],
        Call::SetFlagged {
            user: "rustum".to_string(),
            file: "hamlet".to_string(),
            line: 2,
            starred: true
        }
    );
    let lines = reviewer_lines(&session);
    assert!(lines.iter().find(|l| l.id == 2).unwrap().starred);
    assert!(!lines.iter().find(|l| l.id == 1).unwrap().starred);
}

#[tokio::test]
async fn test_annotate_line_keeps_text_verbatim() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = reviewing_session(&nav, "rustum", "0").await;
    let notes = "pause here;\n  then \"softly\"";

    nav.annotate_line(&mut session, 1, notes).await.unwrap();

    let lines = reviewer_lines(&session);
    assert_eq!(lines.iter().find(|l| l.id == 1).unwrap().notes, notes);
    match session.page() {
        Page::LineReviewer { review_method, .. } => {
            assert_eq!(*review_method, ReviewMethod::InOrder)
        }
        other => panic!("unexpected page {other:?}"),
    }
}

#[tokio::test]
async fn test_line_edits_need_the_reviewer() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();
    nav.select_file(&mut session, "0").await.unwrap();
    engine.clear_calls();

    let err = nav.star_line(&mut session, 1, true).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Navigation(NavigationError::WrongLocation {
            expected: Location::LineReviewer,
            actual: Location::Settings
        })
    ));
    assert!(nav.annotate_line(&mut session, 1, "x").await.is_err());
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_finish_is_terminal_for_review() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = reviewing_session(&nav, "rustum", "0").await;

    assert_eq!(
        nav.finish(&mut session),
        Transition::Moved(Location::SessionFinished)
    );
    assert_eq!(session.page(), &Page::SessionFinished);

    assert!(nav.finish(&mut session).is_stale());
    assert!(
        nav.choose_review_method(&mut session, "random")
            .await
            .unwrap()
            .is_stale()
    );
    assert!(nav.star_line(&mut session, 1, true).await.is_err());
    assert_eq!(session.location(), Location::SessionFinished);

    // A new review can always be started.
    nav.start(&mut session).await.unwrap();
    assert_eq!(session.location(), Location::FileSelect);
}

#[tokio::test]
async fn test_line_sets_does_not_touch_the_session() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let session = new_session("calcifer");

    let sets = nav.line_sets(&session).await.unwrap();

    assert_eq!(sets, vec!["hamlet".to_string(), "macbeth".to_string()]);
    assert_eq!(session.location(), Location::Unset);
}

// ===== SERIALIZATION TESTS =====

#[tokio::test]
async fn test_same_user_requests_wait_for_each_other() {
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let store = SessionStore::new();
    let user = UserId::new("rustum");

    let handle = store.get_or_create(&user).await;
    let guard = handle.lock().await;

    let waiting = {
        let handle = store.get_or_create(&user).await;
        let nav = nav.clone();
        tokio::spawn(async move {
            let mut session = handle.lock().await;
            nav.start(&mut session).await.map(|t| t.location())
        })
    };

    // Another user is not held up.
    let other = store.get_or_create(&UserId::new("calcifer")).await;
    nav.start(&mut *other.lock().await).await.unwrap();

    tokio::task::yield_now().await;
    assert!(!waiting.is_finished());
    assert_eq!(guard.location(), Location::Unset);

    drop(guard);
    assert_eq!(waiting.await.unwrap().unwrap(), Location::FileSelect);
    assert_eq!(handle.lock().await.location(), Location::FileSelect);
    assert!(Arc::strong_count(&handle) >= 2);
}

#[tokio::test]
async fn test_page_always_matches_location() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());
    let mut session = new_session("rustum");

    let mut seen = vec![session.location()];
    nav.start(&mut session).await.unwrap();
    seen.push(session.location());
    let _ = nav.select_file(&mut session, "9").await;
    seen.push(session.location());
    nav.select_file(&mut session, "0").await.unwrap();
    seen.push(session.location());
    nav.choose_review_method(&mut session, "cues").await.unwrap();
    seen.push(session.location());
    nav.finish(&mut session);
    seen.push(session.location());

    assert_eq!(
        seen,
        vec![
            Location::Unset,
            Location::FileSelect,
            Location::FileSelect,
            Location::Settings,
            Location::LineReviewer,
            Location::SessionFinished,
        ]
    );
    assert_eq!(session.page().location(), session.location());
}
