//! The review flow state machine
//!
//! ```text
//! unset ──start──▶ fileselect ──select_file──▶ settings ──choose_review_method──▶ linereviewer ──finish──▶ sessionfinished
//!                      ▲                          │
//!                      └──── builder side-path ───┘  (returns to the page it came from)
//! ```
//!
//! `start` is accepted from every location. The other transitions are bound to
//! one location; called anywhere else they return [`Transition::Stale`] and
//! leave the session alone, so a stale tab or the back button just shows the
//! current page again.
//!
//! Every operation finishes its engine calls before touching the session.
//! A failed call therefore leaves the session exactly as it was.

pub mod errors;

pub use errors::NavigationError;

use std::{path::PathBuf, sync::Arc};

use crate::{
    Error, Result,
    engine::{EngineError, LineEngine, LineRecord, ScratchFile},
    session::{Location, Page, ReturnTo, ReviewMethod, Session},
};

/// What a location-bound operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The session moved to this location.
    Moved(Location),
    /// The session was elsewhere; nothing changed. Carries the current location.
    Stale(Location),
}

impl Transition {
    pub fn location(&self) -> Location {
        match self {
            Transition::Moved(l) | Transition::Stale(l) => *l,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Transition::Stale(_))
    }
}

/// Result of submitting the builder draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuilderOutcome {
    /// The engine stored the set; continue at `return_to`.
    Accepted { return_to: ReturnTo },
    /// The engine refused the content. The diagnostic is also in `draft.error`.
    Rejected { diagnostic: String },
}

/// Drives sessions through the review flow.
///
/// Callers lock the user's [`SessionHandle`](crate::session::SessionHandle)
/// and pass the guarded session in; the navigator never locks anything itself.
#[derive(Clone)]
pub struct Navigator {
    engine: Arc<dyn LineEngine>,
    scratch_dir: PathBuf,
}

impl Navigator {
    /// `scratch_dir` is where builder content is staged for the engine.
    pub fn new(engine: Arc<dyn LineEngine>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Enter the file list, from any location.
    pub async fn start(&self, session: &mut Session) -> Result<Transition> {
        self.enter_file_select(session).await?;
        Ok(Transition::Moved(Location::FileSelect))
    }

    /// Pick entry `raw_index` of the file list and move on to settings.
    pub async fn select_file(&self, session: &mut Session, raw_index: &str) -> Result<Transition> {
        let files = match session.page() {
            Page::FileSelect { files } => files,
            _ => return Ok(stale(session)),
        };

        let file = raw_index
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| files.get(i))
            .cloned()
            .ok_or_else(|| NavigationError::InvalidSelection {
                input: raw_index.to_string(),
                available: files.len(),
            })?;

        tracing::info!(user = %session.user(), file = %file, "Selected line-set");
        session.select_file(file);
        enter_settings(session);
        Ok(Transition::Moved(Location::Settings))
    }

    /// Pick a review method and load the lines for the selected file.
    pub async fn choose_review_method(
        &self,
        session: &mut Session,
        raw_method: &str,
    ) -> Result<Transition> {
        if session.location() != Location::Settings {
            return Ok(stale(session));
        }

        let review_method: ReviewMethod = raw_method.trim().parse().map_err(|_| {
            NavigationError::InvalidReviewMethod {
                input: raw_method.to_string(),
            }
        })?;

        let lines = self.fetch_selected_lines(session).await?;
        session.set_page(Page::LineReviewer {
            lines,
            review_method,
        });
        Ok(Transition::Moved(Location::LineReviewer))
    }

    /// End the review.
    pub fn finish(&self, session: &mut Session) -> Transition {
        if session.location() != Location::LineReviewer {
            return stale(session);
        }
        session.set_page(Page::SessionFinished);
        Transition::Moved(Location::SessionFinished)
    }

    /// Star or unstar a line of the set under review.
    pub async fn star_line(&self, session: &mut Session, line: i64, starred: bool) -> Result<()> {
        let file = reviewing_file(session)?;
        self.engine
            .set_flagged(session.user(), &file, line, starred)
            .await?;
        self.refresh_lines(session).await
    }

    /// Replace the notes on a line of the set under review.
    pub async fn annotate_line(&self, session: &mut Session, line: i64, text: &str) -> Result<()> {
        let file = reviewing_file(session)?;
        self.engine
            .set_notes(session.user(), &file, line, text)
            .await?;
        self.refresh_lines(session).await
    }

    /// The user's line-sets, without changing the session.
    pub async fn line_sets(&self, session: &Session) -> Result<Vec<String>> {
        Ok(self.engine.list_files(session.user()).await?)
    }

    /// Show the builder, remembering where to go afterwards when given.
    pub fn open_builder(&self, session: &mut Session, return_to: Option<ReturnTo>) {
        if let Some(return_to) = return_to {
            session.draft.return_to = return_to;
        }
    }

    /// Save the builder's current title and text.
    pub fn update_draft(&self, session: &mut Session, title: String, text: String) {
        tracing::debug!(user = %session.user(), title = %title, "Draft updated");
        session.draft.title = title;
        session.draft.text = text;
    }

    /// Hand the draft to the engine as a new line-set.
    ///
    /// The content is staged in a scratch file that is removed whatever
    /// happens. A rejection is not an error: the diagnostic lands in the
    /// draft and the session stays where it was.
    pub async fn finish_builder(&self, session: &mut Session) -> Result<BuilderOutcome> {
        let user = session.user().clone();
        let scratch = ScratchFile::create(
            &self.scratch_dir,
            &format!("{user}-lineset-"),
            &session.draft.text,
        )
        .map_err(|source| Error::Resource {
            reason: format!("cannot stage line-set in {}", self.scratch_dir.display()),
            source,
        })?;

        let added = self
            .engine
            .add_set(&user, &session.draft.title, scratch.path())
            .await;
        scratch.remove();

        match added {
            Ok(()) => {}
            Err(EngineError::Rejected { diagnostic, .. }) => {
                tracing::info!(user = %user, "Line-set rejected: {diagnostic}");
                session.draft.error = Some(diagnostic.clone());
                return Ok(BuilderOutcome::Rejected { diagnostic });
            }
            Err(e) => return Err(e.into()),
        }

        let draft = std::mem::take(&mut session.draft);
        tracing::info!(user = %user, title = %draft.title, "Line-set added");

        if draft.return_to == ReturnTo::Session && session.location() == Location::FileSelect {
            session.select_file(draft.title);
            enter_settings(session);
        }

        Ok(BuilderOutcome::Accepted {
            return_to: draft.return_to,
        })
    }

    async fn enter_file_select(&self, session: &mut Session) -> Result<()> {
        let files = self.engine.list_files(session.user()).await?;
        tracing::debug!(user = %session.user(), count = files.len(), "Listed line-sets");
        session.set_page(Page::FileSelect { files });
        Ok(())
    }

    async fn fetch_selected_lines(&self, session: &Session) -> Result<Vec<LineRecord>> {
        let file = session
            .selected_file()
            .ok_or(NavigationError::NoFileSelected)?;
        Ok(self.engine.fetch_lines(session.user(), file).await?)
    }

    /// Replace the reviewer's lines with a fresh copy from the engine.
    async fn refresh_lines(&self, session: &mut Session) -> Result<()> {
        let fresh = self.fetch_selected_lines(session).await?;
        if let Page::LineReviewer { review_method, .. } = session.page() {
            let review_method = *review_method;
            session.set_page(Page::LineReviewer {
                lines: fresh,
                review_method,
            });
        }
        Ok(())
    }
}

fn stale(session: &Session) -> Transition {
    tracing::debug!(
        user = %session.user(),
        location = %session.location(),
        "Ignoring transition from stale page"
    );
    Transition::Stale(session.location())
}

fn enter_settings(session: &mut Session) {
    session.set_page(Page::Settings {
        options: ReviewMethod::ALL.to_vec(),
    });
}

/// The selected file, provided the session is in the line reviewer.
fn reviewing_file(session: &Session) -> Result<String> {
    if session.location() != Location::LineReviewer {
        return Err(NavigationError::WrongLocation {
            expected: Location::LineReviewer,
            actual: session.location(),
        }
        .into());
    }
    session
        .selected_file()
        .map(str::to_string)
        .ok_or_else(|| NavigationError::NoFileSelected.into())
}
