//! Terminal rendering for the CLI.
//!
//! Notifications and field messages go to stderr; list rows and the
//! username go to stdout so they can be piped.

use std::io::Write;
use std::time::Duration;

use tracing::debug;

use super::{Control, Field, ListView, Notice, NoticeLevel, Page, Surface};
use crate::validation::FieldCheck;

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalSurface {
    has_list: bool,
    dashboard: bool,
}

impl TerminalSurface {
    /// A surface for commands that submit a form and print nothing else.
    #[must_use]
    pub fn form() -> Self {
        Self { has_list: false, dashboard: false }
    }

    /// A surface for commands that print the link list.
    #[must_use]
    pub fn list() -> Self {
        Self { has_list: true, dashboard: false }
    }

    /// The full dashboard: signed-in user plus link list.
    #[must_use]
    pub fn dashboard() -> Self {
        Self { has_list: true, dashboard: true }
    }
}

fn level_prefix(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    }
}

/// One list row: `<id>\t<title>\t<url>`.
#[must_use]
pub fn format_row(id: &str, title: &str, url: &str) -> String {
    format!("{id}\t{title}\t{url}")
}

impl Surface for TerminalSurface {
    fn notify(&self, notice: Notice) {
        eprintln!("[{}] {}", level_prefix(notice.level), notice.text);
    }

    fn set_field_state(&self, field: Field, check: &FieldCheck) {
        if !check.valid {
            eprintln!("  {}: {}", field.name(), check.message);
        }
    }

    fn set_loading(&self, control: &Control, loading: bool) {
        debug!(?control, loading, "loading indicator");
    }

    fn render_links(&self, view: ListView) {
        let mut out = std::io::stdout().lock();
        let _ = match view {
            ListView::Empty(message) | ListView::Error(message) => writeln!(out, "{message}"),
            ListView::Links(links) => links
                .iter()
                .try_for_each(|link| writeln!(out, "{}", format_row(&link.id, &link.title, &link.url))),
        };
    }

    fn show_username(&self, username: &str) {
        println!("Signed in as {username}");
    }

    fn clear_link_form(&self) {}

    fn redirect(&self, page: Page, delay: Duration) {
        debug!(page = page.path(), ?delay, "redirect scheduled");
        let hint = match page {
            Page::Login => "run `linkmark login <email> <password>` to continue",
            Page::Signup => "run `linkmark signup <username> <email> <password>` to continue",
            Page::Dashboard => "run `linkmark links` to see your bookmarks",
        };
        eprintln!("  next: {hint}");
    }

    fn has_link_list(&self) -> bool {
        self.has_list
    }

    fn is_dashboard(&self) -> bool {
        self.dashboard
    }
}
