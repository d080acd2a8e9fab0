//! Core data types for per-user sessions

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::engine::LineRecord;

/// Which page a session is on.
///
/// Always derived from [`Page`], never stored on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Unset,
    FileSelect,
    Settings,
    LineReviewer,
    SessionFinished,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Unset => "unset",
            Location::FileSelect => "fileselect",
            Location::Settings => "settings",
            Location::LineReviewer => "linereviewer",
            Location::SessionFinished => "sessionfinished",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the line reviewer walks through a line-set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMethod {
    InOrder,
    Random,
    Cues,
    NoCues,
}

impl ReviewMethod {
    /// Every method, in the order the settings page lists them.
    pub const ALL: [ReviewMethod; 4] = [
        ReviewMethod::InOrder,
        ReviewMethod::Random,
        ReviewMethod::Cues,
        ReviewMethod::NoCues,
    ];

    /// Form value for this method
    pub fn code(&self) -> &'static str {
        match self {
            ReviewMethod::InOrder => "in_order",
            ReviewMethod::Random => "random",
            ReviewMethod::Cues => "cues",
            ReviewMethod::NoCues => "no_cues",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReviewMethod::InOrder => "In order",
            ReviewMethod::Random => "Random order",
            ReviewMethod::Cues => "Cues from lines",
            ReviewMethod::NoCues => "No cues",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReviewMethod::InOrder => "Review lines in order",
            ReviewMethod::Random => "Review lines from cues in a random order",
            ReviewMethod::Cues => "Advanced: recall cues from lines",
            ReviewMethod::NoCues => "Advanced: recall lines only based on order",
        }
    }
}

/// Returned when a review method code is not one of [`ReviewMethod::ALL`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownReviewMethod;

impl FromStr for ReviewMethod {
    type Err = UnknownReviewMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewMethod::ALL
            .into_iter()
            .find(|m| m.code() == s)
            .ok_or(UnknownReviewMethod)
    }
}

/// The data behind the session's current page.
///
/// One variant per [`Location`]; the location is read off the variant, so the
/// two can never disagree. The builder is not a page: it is rendered from the
/// session's [`Draft`] over whatever page the session is on.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Unset,
    FileSelect {
        files: Vec<String>,
    },
    Settings {
        options: Vec<ReviewMethod>,
    },
    LineReviewer {
        lines: Vec<LineRecord>,
        review_method: ReviewMethod,
    },
    SessionFinished,
}

impl Page {
    pub fn location(&self) -> Location {
        match self {
            Page::Unset => Location::Unset,
            Page::FileSelect { .. } => Location::FileSelect,
            Page::Settings { .. } => Location::Settings,
            Page::LineReviewer { .. } => Location::LineReviewer,
            Page::SessionFinished => Location::SessionFinished,
        }
    }
}

/// Where the builder sends the user after a successful submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnTo {
    /// The home page
    #[default]
    Home,
    /// Back into the review session
    Session,
}

impl ReturnTo {
    /// Parse the builder's `returnTo` query value. Anything unrecognised is `None`.
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "session" => Some(ReturnTo::Session),
            "home" | "index" => Some(ReturnTo::Home),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ReturnTo::Home => "/",
            ReturnTo::Session => "/session",
        }
    }
}

/// In-progress line-set being written on the builder page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub text: String,
    /// Diagnostic from the last rejected submission
    pub error: Option<String>,
    pub return_to: ReturnTo,
}
