//! Which top-level view is showing.

use std::fmt::Display;

use crate::core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Waiting for the session to restore
    #[default]
    Loading,
    /// Lead form + public calendar
    Public,
    Login,
    /// Lead roster + private calendar
    Authenticated,
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            View::Loading => "loading",
            View::Public => "public",
            View::Login => "login",
            View::Authenticated => "dashboard",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// Session restore finished
    Ready { authenticated: bool },
    /// "I am the freelancer"
    RequestLogin,
    Back,
    LoginSucceeded,
    Logout,
}

impl Display for ViewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewEvent::Ready { authenticated } => write!(f, "ready(authenticated={})", authenticated),
            ViewEvent::RequestLogin => write!(f, "request-login"),
            ViewEvent::Back => write!(f, "back"),
            ViewEvent::LoginSucceeded => write!(f, "login-succeeded"),
            ViewEvent::Logout => write!(f, "logout"),
        }
    }
}

/// State machine over `View`. There is no terminal state.
#[derive(Debug, Default)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// The view `event` leads to from `from`, if that transition exists.
    pub fn next(from: View, event: ViewEvent) -> Option<View> {
        use View::*;
        use ViewEvent::*;

        match (from, event) {
            (Loading, Ready { authenticated: false }) => Some(Public),
            (Loading, Ready { authenticated: true }) => Some(Authenticated),
            (Public, RequestLogin) => Some(Login),
            (Login, Back) => Some(Public),
            (Login, LoginSucceeded) => Some(Authenticated),
            (Authenticated, Logout) => Some(Public),
            _ => None,
        }
    }

    pub fn apply(&mut self, event: ViewEvent) -> Result<View> {
        let next = Self::next(self.current, event).ok_or_else(|| Error::InvalidTransition {
            from: self.current.to_string(),
            event: event.to_string(),
        })?;
        tracing::debug!(from = %self.current, to = %next, "View transition");
        self.current = next;

        Ok(next)
    }
}
