use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unauthenticated,
    Authenticated,
}

/// In-memory holder of the current bearer token.
///
/// Writers are serialized by the mutex; two logins racing each other still
/// resolve last-write-wins in completion order.
#[derive(Debug, Default)]
pub struct AuthState {
    token: Mutex<Option<String>>,
}

impl AuthState {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            token: Mutex::new(initial.filter(|t| !t.is_empty())),
        }
    }

    /// Replaces the stored token and returns the previous one. `None` or an
    /// empty string clears it.
    pub fn set(&self, token: Option<String>) -> Option<String> {
        let mut guard = self.token.lock().unwrap_or_else(|err| err.into_inner());
        std::mem::replace(&mut *guard, token.filter(|t| !t.is_empty()))
    }

    pub fn get(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn status(&self) -> AuthStatus {
        if self.get().is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }
}
