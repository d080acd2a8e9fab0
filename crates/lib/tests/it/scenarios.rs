//! End-to-end request sequences, wired the way the server wires them

use std::sync::Arc;

use feline::{
    Error,
    auth::{AuthError, CredentialTable, TokenStore},
    navigation::{BuilderOutcome, NavigationError, Navigator},
    session::{Location, SessionStore},
};

use crate::helpers::*;

struct Server {
    credentials: CredentialTable,
    tokens: TokenStore,
    sessions: SessionStore,
}

impl Server {
    fn new() -> Self {
        Self {
            credentials: CredentialTable::default(),
            tokens: TokenStore::new(),
            sessions: SessionStore::new(),
        }
    }
}

#[tokio::test]
async fn test_login_lists_files_for_the_user() {
    let server = Server::new();
    let engine = FakeEngine::with_files(&["hamlet"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());

    let user = server.credentials.authenticate("rustum", "ruu").unwrap();
    let token = server.tokens.issue(user).await.unwrap();

    let user = server.tokens.resolve(&token).await.unwrap();
    let handle = server.sessions.get_or_create(&user).await;
    let mut session = handle.lock().await;
    nav.start(&mut session).await.unwrap();

    assert_eq!(session.location(), Location::FileSelect);
    assert_eq!(
        engine.calls(),
        vec![Call::ListFiles {
            user: "rustum".to_string()
        }]
    );
}

#[tokio::test]
async fn test_bad_password_issues_no_token() {
    let server = Server::new();

    let err = server
        .credentials
        .authenticate("rustum", "wrong")
        .unwrap_err();

    assert!(matches!(err, AuthError::BadPassword { .. }));
    assert!(err.user_message().contains("password incorrect"));
    assert!(server.tokens.is_empty().await);
    assert!(server.sessions.is_empty().await);
}

#[tokio::test]
async fn test_logout_keeps_the_session_for_next_login() {
    let server = Server::new();
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine.clone(), dir.path());

    let user = server.credentials.authenticate("rustum", "ruu").unwrap();
    let first = server.tokens.issue(user.clone()).await.unwrap();
    {
        let handle = server.sessions.get_or_create(&user).await;
        let mut session = handle.lock().await;
        nav.start(&mut session).await.unwrap();
        nav.select_file(&mut session, "1").await.unwrap();
    }

    server.tokens.revoke(&first).await;
    assert!(server.tokens.resolve(&first).await.is_err());

    let second = server.tokens.issue(user).await.unwrap();
    let user = server.tokens.resolve(&second).await.unwrap();
    let handle = server.sessions.get_or_create(&user).await;
    let session = handle.lock().await;
    assert_eq!(session.location(), Location::Settings);
    assert_eq!(session.selected_file(), Some("macbeth"));
}

#[tokio::test]
async fn test_out_of_range_selection_leaves_file_list() {
    let engine = FakeEngine::with_files(&["hamlet", "macbeth"]);
    let dir = tempfile::tempdir().unwrap();
    let nav = navigator(engine, dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();

    let err = nav.select_file(&mut session, "5").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Navigation(NavigationError::InvalidSelection { .. })
    ));
    assert!(err.is_client_error());
    assert_eq!(session.location(), Location::FileSelect);
}

#[cfg(unix)]
#[tokio::test]
async fn test_builder_failure_from_real_process() {
    use feline::engine::ProcessEngine;

    let engine_dir = tempfile::tempdir().unwrap();
    let scratch_dir = tempfile::tempdir().unwrap();
    let program = write_engine_script(
        engine_dir.path(),
        r#"
case "$3" in
  list-files) echo '["hamlet"]' ;;
  add-set) cp "$5" "$HERE/submitted.txt"; printf 'line 3: missing cue' >&2; exit 1 ;;
esac
"#,
    );
    let engine = ProcessEngine::new(program, engine_dir.path());
    let nav = Navigator::new(Arc::new(engine), scratch_dir.path());
    let mut session = new_session("rustum");
    nav.start(&mut session).await.unwrap();

    nav.update_draft(
        &mut session,
        "Hamlet I.i".to_string(),
        "Who's there?\nNay, answer me\n".to_string(),
    );
    let outcome = nav.finish_builder(&mut session).await.unwrap();

    assert_eq!(
        outcome,
        BuilderOutcome::Rejected {
            diagnostic: "line 3: missing cue".to_string()
        }
    );
    assert_eq!(session.draft().error.as_deref(), Some("line 3: missing cue"));
    assert_eq!(session.location(), Location::FileSelect);

    // The engine saw the content, and the scratch file is gone afterwards.
    assert_eq!(
        std::fs::read_to_string(engine_dir.path().join("submitted.txt")).unwrap(),
        "Who's there?\nNay, answer me\n"
    );
    assert!(leftover_files(scratch_dir.path()).is_empty());

    let args = recorded_args(engine_dir.path());
    let add_set = &args[args.len() - 5..];
    assert_eq!(&add_set[..4], ["--user", "rustum", "add-set", "Hamlet I.i"]);
}
