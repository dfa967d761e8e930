//! Session holder for the authenticated provider client.

use crate::data::provider::{Authenticator, BarSource, DataError};

/// Interactive-session state: at most one authenticated client.
///
/// The client is absent until a login succeeds. A failed login leaves any
/// earlier client in place.
#[derive(Default)]
pub struct Session {
    client: Option<Box<dyn BarSource>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single authentication attempt; stores the client on success.
    pub fn login(
        &mut self,
        auth: &dyn Authenticator,
        username: &str,
        password: &str,
    ) -> Result<(), DataError> {
        tracing::info!(username, "login attempt");
        match auth.authenticate(username, password) {
            Ok(client) => {
                tracing::info!(source = client.name(), "login succeeded");
                self.client = Some(client);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&dyn BarSource> {
        self.client.as_deref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client.as_ref().map(|c| c.name()))
            .finish()
    }
}
