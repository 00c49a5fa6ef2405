//! Gate for instance-scoped views
//!
//! Two phases: while the store is hydrating the gate reports
//! [`GuardState::Loading`]; once hydrated it either lets the view render with
//! the selected instance or sends the user to a fallback route. The redirect
//! is issued once per guard; a view keeps one guard for as long as it is
//! mounted and creates a new one when mounted again.

use crate::store::{SelectedInstance, Store};

/// What a gated view should do right now
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState<'a, R> {
    /// Persisted state not read yet; show a loading placeholder
    Loading,

    /// No instance selected; navigate to the route (emitted once)
    Redirect(R),

    /// Redirect already issued, nothing selected; render nothing
    Redirected,

    /// Render the view for this instance
    Render(&'a SelectedInstance),
}

/// Per-mount instance guard
#[derive(Debug, Clone)]
pub struct InstanceGuard<R> {
    fallback: R,
    redirected: bool,
}

impl<R: Clone> InstanceGuard<R> {
    pub fn new(fallback: R) -> Self {
        Self {
            fallback,
            redirected: false,
        }
    }

    /// Evaluate the gate against the current store
    pub fn check<'a>(&mut self, store: &'a Store) -> GuardState<'a, R> {
        if !store.is_hydrated() {
            return GuardState::Loading;
        }

        match store.selected_instance() {
            Some(instance) => GuardState::Render(instance),
            None if self.redirected => GuardState::Redirected,
            None => {
                self.redirected = true;
                GuardState::Redirect(self.fallback.clone())
            }
        }
    }

    pub fn has_redirected(&self) -> bool {
        self.redirected
    }
}
