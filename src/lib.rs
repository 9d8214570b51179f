//! Client for a link-bookmarking backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`controller::ClientFormController`] runs the user flows (signup, login,
//! add/list/delete links, dashboard bootstrap, logout) against the backend
//! through [`net::api::ApiClient`], validating input with [`validation`]
//! and rendering through a [`ui::Surface`]. The bearer token lives in an
//! explicit [`session::Session`].

pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod net;
pub mod session;
pub mod ui;
pub mod validation;

#[cfg(test)]
mod test_support;
