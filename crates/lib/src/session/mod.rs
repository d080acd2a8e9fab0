//! Per-user review sessions
//!
//! A [`Session`] records where a user is in the review flow, which line-set
//! they picked and their unfinished builder draft. Sessions outlive login
//! tokens: logging out and back in resumes the same session.
//!
//! Only the [`Navigator`](crate::navigation::Navigator) changes a session's page;
//! everything else reads it.

pub mod store;
pub mod types;

pub use store::{SessionHandle, SessionStore};
pub use types::*;

use crate::auth::UserId;

/// Mutable navigation state for one user.
#[derive(Clone, Debug)]
pub struct Session {
    user: UserId,
    username: String,
    selected_file: Option<String>,
    page: Page,
    pub(crate) draft: Draft,
}

impl Session {
    pub fn new(user: UserId) -> Self {
        Self {
            username: user.as_str().to_string(),
            user,
            selected_file: None,
            page: Page::Unset,
            draft: Draft::default(),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Display name
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn location(&self) -> Location {
        self.page.location()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The line-set under review, once one has been chosen.
    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Whether a review is in progress (the home page offers to resume it).
    pub fn is_reviewing(&self) -> bool {
        self.location() == Location::LineReviewer
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        tracing::debug!(
            user = %self.user,
            from = %self.page.location(),
            to = %page.location(),
            "Session page change"
        );
        self.page = page;
    }

    pub(crate) fn select_file(&mut self, file: String) {
        self.selected_file = Some(file);
    }
}
