// The `context_hub` module owns the single Gmail authentication of a process.

use super::google_auth::{AuthError, GConf, GmailHubType, gmail_auth};
use google_gmail1::api::Scope;
use std::sync::{Mutex, PoisonError};
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

/// A hub for managing Google API authentication.
///
/// Components that need Gmail access register the scopes they use, then ask
/// for the hub. The first `get_hub` call authenticates once with every scope
/// collected so far, so the user sees a single consent screen; later calls
/// return the cached hub.
///
/// Meant to be shared behind an `Arc`.
pub struct ContextHub {
    gconf: GConf,
    scopes: Mutex<Vec<Scope>>,
    hub: TokioMutex<Option<GmailHubType>>,
}

impl ContextHub {
    /// Creates a hub that authenticates with the files named by `gconf`.
    pub fn new(gconf: GConf) -> Self {
        Self {
            gconf,
            scopes: Mutex::new(Vec::new()),
            hub: TokioMutex::new(None),
        }
    }

    /// Adds a new scope to the hub. Duplicates are ignored.
    pub fn add_scope(&self, scope: Scope) {
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
        debug!("Registered scopes: {:?}", scopes);
    }

    /// Returns the scopes registered so far.
    pub fn scopes(&self) -> Vec<Scope> {
        self.scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the authenticated `GmailHubType`, authenticating on first use.
    pub async fn get_hub(&self) -> Result<GmailHubType, AuthError> {
        let mut cached = self.hub.lock().await;
        match cached.as_ref() {
            Some(hub) => Ok(hub.clone()),
            None => {
                // Snapshot the scopes so the std mutex is not held across the await.
                let hub = gmail_auth(self.gconf.clone(), &self.scopes()).await?;
                debug!("Gmail hub cached for later callers");
                Ok(cached.insert(hub).clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_scope_deduplicates() {
        let hub = ContextHub::new(GConf::in_dir("./tmp"));
        hub.add_scope(Scope::Readonly);
        hub.add_scope(Scope::Compose);
        hub.add_scope(Scope::Readonly);

        assert_eq!(hub.scopes(), vec![Scope::Readonly, Scope::Compose]);
    }

    #[tokio::test]
    async fn get_hub_fails_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let hub = ContextHub::new(GConf::in_dir(dir.path()));
        hub.add_scope(Scope::Readonly);

        let result = hub.get_hub().await;

        assert!(matches!(result, Err(AuthError::SecretRead { .. })));
    }
}
