//! The client form controller: one method per user-triggered flow.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each flow validates its input, calls the backend through [`ApiClient`],
//! and reports everything user-visible to a [`Surface`]. The caller owns the
//! [`Session`] and passes it in; flows that change it take `&mut`.
//!
//! CONCURRENCY
//! ===========
//! Submit and delete controls are disabled while their request is in
//! flight: a second trigger returns [`FlowError::Busy`] without touching the
//! network. List reloads may overlap; only the most recently started one is
//! rendered.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, FlowError};
use crate::forms::{Form, LinkForm, LoginForm, SignupForm};
use crate::net::api::ApiClient;
use crate::net::types::{Link, LoginRequest, NewLink, SignupRequest};
use crate::session::Session;
use crate::ui::{Control, EMPTY_LIST_MESSAGE, Field, LIST_ERROR_MESSAGE, ListView, Notice, Page, Surface};
use crate::validation::{FieldCheck, validate};

pub const INVALID_FORM_MESSAGE: &str = "Please fix the highlighted fields.";

pub struct ClientFormController<S: Surface> {
    api: ApiClient,
    surface: S,
    redirect_delay: Duration,
    in_flight: Mutex<HashSet<Control>>,
    list_generation: AtomicU64,
}

/// Marks a control busy for as long as it lives.
struct InFlight<'a, S: Surface> {
    owner: &'a ClientFormController<S>,
    control: Control,
}

impl<S: Surface> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.owner.surface.set_loading(&self.control, false);
        if let Ok(mut set) = self.owner.in_flight.lock() {
            set.remove(&self.control);
        }
    }
}

impl<S: Surface> ClientFormController<S> {
    #[must_use]
    pub fn new(api: ApiClient, surface: S, redirect_delay: Duration) -> Self {
        Self {
            api,
            surface,
            redirect_delay,
            in_flight: Mutex::new(HashSet::new()),
            list_generation: AtomicU64::new(0),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the API client cannot be built from `config`.
    pub fn from_config(config: &ClientConfig, surface: S) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::new(config)?, surface, config.redirect_delay))
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn is_busy(&self, control: &Control) -> bool {
        self.in_flight.lock().map(|set| set.contains(control)).unwrap_or(false)
    }

    fn ensure_idle(&self, control: &Control) -> Result<(), FlowError> {
        if self.is_busy(control) {
            debug!(?control, "control busy, ignoring trigger");
            return Err(FlowError::Busy(control.clone()));
        }
        Ok(())
    }

    fn begin(&self, control: Control) -> Result<InFlight<'_, S>, FlowError> {
        let inserted = self
            .in_flight
            .lock()
            .map(|mut set| set.insert(control.clone()))
            .unwrap_or(false);
        if !inserted {
            debug!(?control, "control busy, ignoring trigger");
            return Err(FlowError::Busy(control));
        }
        self.surface.set_loading(&control, true);
        Ok(InFlight { owner: self, control })
    }

    /// Show a failed request to the user, then hand the error back.
    fn surfaced<T>(&self, result: Result<T, ApiError>) -> Result<T, FlowError> {
        result.map_err(|e| {
            self.surface.notify(Notice::error(e.user_message()));
            FlowError::Api(e)
        })
    }

    fn check_form(&self, form: &impl Form) -> Result<(), FlowError> {
        let mut invalid = Vec::new();
        for (field, check) in form.checks() {
            self.surface.set_field_state(field, &check);
            if !check.valid {
                invalid.push(field);
            }
        }
        if invalid.is_empty() {
            return Ok(());
        }
        self.surface.notify(Notice::warning(INVALID_FORM_MESSAGE));
        Err(FlowError::Invalid(invalid))
    }

    /// Re-validate one field as the user types.
    pub fn field_input(&self, field: Field, raw: &str) -> FieldCheck {
        let check = validate(field, raw);
        self.surface.set_field_state(field, &check);
        check
    }

    // =========================================================================
    // FORM FLOWS
    // =========================================================================

    /// Create an account, then send the user to the login page.
    ///
    /// # Errors
    ///
    /// `Invalid` when a field fails validation, `Busy` while a signup is in
    /// flight, `Api` when the backend rejects the request.
    pub async fn signup(&self, session: &Session, form: &SignupForm) -> Result<(), FlowError> {
        self.ensure_idle(&Control::SignupSubmit)?;
        self.check_form(form)?;
        let _busy = self.begin(Control::SignupSubmit)?;

        let body = SignupRequest { username: form.username.trim(), email: &form.email, password: &form.password };
        let response = self.surfaced(self.api.signup(session, &body).await)?;

        info!(email = %form.email, "signup succeeded");
        let message = response.message.unwrap_or_else(|| "Signup successful!".to_owned());
        self.surface.notify(Notice::success(format!("{message} Please log in.")));
        self.surface.redirect(Page::Login, self.redirect_delay);
        Ok(())
    }

    /// Exchange credentials for a token, store it, and go to the dashboard.
    ///
    /// # Errors
    ///
    /// `Invalid`, `Busy`, or `Api` as for [`Self::signup`]; `Storage` if the
    /// token cannot be persisted.
    pub async fn login(&self, session: &mut Session, form: &LoginForm) -> Result<(), FlowError> {
        self.ensure_idle(&Control::LoginSubmit)?;
        self.check_form(form)?;
        let _busy = self.begin(Control::LoginSubmit)?;

        let body = LoginRequest { email: &form.email, password: &form.password };
        let token = self.surfaced(self.api.login(session, &body).await)?;

        if let Err(e) = session.store_token(&token) {
            warn!(error = %e, "could not persist token");
            self.surface.notify(Notice::error("Could not save your session."));
            return Err(FlowError::Storage(e));
        }

        info!(email = %form.email, "login succeeded");
        self.surface.notify(Notice::success("Login successful!"));
        self.surface.redirect(Page::Dashboard, self.redirect_delay);
        Ok(())
    }

    /// Save a new link, clear the form, and refresh the list.
    ///
    /// # Errors
    ///
    /// `Invalid`, `Busy`, or `Api` as for [`Self::signup`]. A failed list
    /// refresh afterwards does not fail this flow.
    pub async fn add_link(&self, session: &Session, form: &LinkForm) -> Result<(), FlowError> {
        self.ensure_idle(&Control::AddLinkSubmit)?;
        self.check_form(form)?;
        let _busy = self.begin(Control::AddLinkSubmit)?;

        let body = NewLink { title: form.title.trim(), url: form.url.trim() };
        let response = self.surfaced(self.api.add_link(session, &body).await)?;

        info!(title = body.title, "link added");
        self.surface.notify(Notice::success(response.message.unwrap_or_else(|| "Link added!".to_owned())));
        self.surface.clear_link_form();
        if let Err(e) = self.load_links(session).await {
            debug!(error = %e, "list refresh after add failed");
        }
        Ok(())
    }

    // =========================================================================
    // LINK LIST
    // =========================================================================

    /// Fetch and render the link list. No-op when the surface has no list.
    ///
    /// # Errors
    ///
    /// `Api` when the fetch fails; the list then shows an error placeholder.
    pub async fn load_links(&self, session: &Session) -> Result<Vec<Link>, FlowError> {
        if !self.surface.has_link_list() {
            return Ok(Vec::new());
        }
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.set_loading(&Control::LinkList, true);

        let result = self.api.user_links(session).await;

        if self.list_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "newer list reload started, discarding result");
            return result.map_err(FlowError::Api);
        }
        let outcome = match result {
            Ok(links) => {
                debug!(count = links.len(), "links loaded");
                if links.is_empty() {
                    self.surface.render_links(ListView::Empty(EMPTY_LIST_MESSAGE.to_owned()));
                } else {
                    self.surface.render_links(ListView::Links(links.clone()));
                }
                Ok(links)
            }
            Err(e) => {
                self.surface.render_links(ListView::Error(LIST_ERROR_MESSAGE.to_owned()));
                self.surfaced(Err(e))
            }
        };
        self.surface.set_loading(&Control::LinkList, false);
        outcome
    }

    /// Delete one link and refresh the list.
    ///
    /// # Errors
    ///
    /// `Busy` while a delete of the same link is in flight, `Api` when the
    /// backend rejects it.
    pub async fn delete_link(&self, session: &Session, link_id: &str) -> Result<(), FlowError> {
        let _busy = self.begin(Control::DeleteLink(link_id.to_owned()))?;

        let response = self.surfaced(self.api.delete_link(session, link_id).await)?;

        info!(link_id, "link deleted");
        self.surface.notify(Notice::success(response.message.unwrap_or_else(|| "Link deleted!".to_owned())));
        if let Err(e) = self.load_links(session).await {
            debug!(error = %e, "list refresh after delete failed");
        }
        Ok(())
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Show the signed-in user, or send the visitor back to login.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a token, `Api` when `/user` fails.
    pub async fn bootstrap_dashboard(&self, session: &Session) -> Result<String, FlowError> {
        if !session.is_authenticated() {
            self.surface.notify(Notice::warning("Please log in first."));
            self.surface.redirect(Page::Login, self.redirect_delay);
            return Err(FlowError::NotAuthenticated);
        }
        let _busy = self.begin(Control::UserInfo)?;

        match self.surfaced(self.api.current_user(session).await) {
            Ok(user) => {
                self.surface.show_username(&user.username);
                Ok(user.username)
            }
            Err(e) => {
                self.surface.redirect(Page::Login, self.redirect_delay);
                Err(e)
            }
        }
    }

    /// Everything that runs when a page opens: the dashboard bootstrap when
    /// this is the dashboard, then the first list load when there is a list.
    ///
    /// # Errors
    ///
    /// The first failing step's error.
    pub async fn on_page_load(&self, session: &Session) -> Result<(), FlowError> {
        if self.surface.is_dashboard() {
            self.bootstrap_dashboard(session).await?;
        }
        if self.surface.has_link_list() {
            self.load_links(session).await?;
        }
        Ok(())
    }

    /// Forget the token and return to the login page.
    ///
    /// # Errors
    ///
    /// `Storage` if the stored token could not be removed. The in-memory
    /// session is cleared regardless.
    pub fn logout(&self, session: &mut Session) -> Result<(), FlowError> {
        let cleared = session.clear();
        match &cleared {
            Ok(()) => {
                info!("logged out");
                self.surface.notify(Notice::info("You have been logged out."));
            }
            Err(e) => {
                warn!(error = %e, "could not remove stored token");
                self.surface.notify(Notice::error("Could not remove the stored session."));
            }
        }
        self.surface.redirect(Page::Login, self.redirect_delay);
        cleared.map_err(FlowError::Storage)
    }

    /// Check that the backend answers.
    ///
    /// # Errors
    ///
    /// `Api` when the health endpoint fails.
    pub async fn ping(&self, session: &Session) -> Result<String, FlowError> {
        let response = self.surfaced(self.api.ping(session).await)?;
        Ok(response.message.unwrap_or_else(|| "ok".to_owned()))
    }
}
