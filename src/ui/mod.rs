//! Rendering surface abstraction.
//!
//! SYSTEM CONTEXT
//! ==============
//! Flows in [`crate::controller`] never touch a concrete UI. They report
//! field states, loading toggles, notifications, list renders, and redirects
//! to a [`Surface`]. The CLI renders to the terminal; tests record calls.

pub mod terminal;

use std::time::Duration;

use crate::net::types::Link;
use crate::validation::FieldCheck;

/// Input fields that carry inline validation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    /// Signup password, subject to strength rules.
    Password,
    /// Login password, only required to be present.
    LoginPassword,
    Title,
    Url,
}

impl Field {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password | Self::LoginPassword => "password",
            Self::Title => "title",
            Self::Url => "url",
        }
    }
}

/// Controls that show a loading indicator and are disabled while busy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    SignupSubmit,
    LoginSubmit,
    AddLinkSubmit,
    LinkList,
    /// The delete button bound to one link id.
    DeleteLink(String),
    UserInfo,
}

/// Navigation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Signup,
    Login,
    Dashboard,
}

impl Page {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Signup => "signup.html",
            Self::Login => "login.html",
            Self::Dashboard => "dashboard.html",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient on-screen notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

pub const EMPTY_LIST_MESSAGE: &str = "No links saved yet.";
pub const LIST_ERROR_MESSAGE: &str = "Failed to load links.";

/// What the link list container currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    /// Placeholder for an empty collection.
    Empty(String),
    /// One row per link; each row's delete control is `Control::DeleteLink(link.id)`.
    Links(Vec<Link>),
    /// Placeholder shown when the collection could not be fetched.
    Error(String),
}

/// Everything a flow can do to the user interface.
///
/// Methods take `&self` so overlapping flows can share one surface;
/// implementations use interior mutability where they keep state.
pub trait Surface: Send + Sync {
    fn notify(&self, notice: Notice);

    fn set_field_state(&self, field: Field, check: &FieldCheck);

    fn set_loading(&self, control: &Control, loading: bool);

    fn render_links(&self, view: ListView);

    fn show_username(&self, username: &str);

    /// Empty the add-link form after a successful submission.
    fn clear_link_form(&self);

    /// Schedule navigation to `page` after `delay`.
    fn redirect(&self, page: Page, delay: Duration);

    /// Whether this surface has a link list container to render into.
    fn has_link_list(&self) -> bool;

    /// Whether this surface is the dashboard (shows the signed-in user).
    fn is_dashboard(&self) -> bool;
}
