// Mutual-exclusion tokens over a class of long-running operations.
//
// A gate holds at most one token. Whoever takes it keeps a guard for the life of
// the request; dropping the guard clears the token, so a request that fails or
// returns early can never leave the gate closed.

use std::sync::{Mutex, PoisonError};

use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[strum(to_string = "Story generation")]
    GenerateStory,
    #[strum(to_string = "Story formatting")]
    FormatStory,
    #[strum(to_string = "Storyboard generation")]
    GenerateStoryboard,
    #[strum(to_string = "Template optimization")]
    OptimizeTemplate,
}

#[derive(Debug)]
pub struct Gate<K> {
    current: Mutex<Option<K>>,
}

impl<K> Default for Gate<K> {
    fn default() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }
}

impl<K: Clone> Gate<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate for `token`, or returns `None` when another request holds it.
    pub fn try_enter(&self, token: K) -> Option<GateGuard<'_, K>> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_some() {
            return None;
        }
        *current = Some(token);
        Some(GateGuard { gate: self })
    }

    /// The token of the request currently holding the gate.
    pub fn current(&self) -> Option<K> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_open(&self) -> bool {
        self.current().is_none()
    }
}

#[must_use = "the gate reopens as soon as the guard is dropped"]
#[derive(Debug)]
pub struct GateGuard<'a, K> {
    gate: &'a Gate<K>,
}

impl<K> Drop for GateGuard<'_, K> {
    fn drop(&mut self) {
        *self
            .gate
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
