//! The session: a bearer credential plus the identity it belongs to.
//!
//! `SessionStore` holds the in-memory session and mirrors the credential into a file so that it
//! survives across runs. It is the only place that creates or destroys a `Session`.

use crate::api::{FinanceApi, Reply};
use crate::model::{AuthData, User};
use crate::{utils, Result};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An authenticated session. Protected API calls take a `&Session`, so none can be made
/// without one.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    credential: String,
    user: Option<User>,
}

impl Session {
    pub fn new(credential: impl Into<String>, user: Option<User>) -> Self {
        Self {
            credential: credential.into(),
            user,
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// What happened when the store tried to restore a session at start-up.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydration {
    /// No credential was stored; nothing was sent.
    NoCredential,
    /// The stored credential was accepted and the identity loaded.
    Restored(User),
    /// The API rejected the credential; the session was ended.
    Rejected(Option<String>),
    /// The profile call failed in transport; the session was ended.
    Unreachable(String),
}

/// Owns the current session and its durable copy.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    session: Option<Session>,
}

impl SessionStore {
    /// Creates a store whose durable credential lives at `path`. Nothing is read until
    /// `hydrate` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Reads the durable credential, if any.
    pub async fn stored_credential(&self) -> Result<Option<String>> {
        Ok(utils::read_optional(&self.path)
            .await?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// Exchanges email and password for a credential. On success the credential is kept in
    /// memory and written to disk.
    pub async fn login(
        &mut self,
        api: &mut FinanceApi,
        email: &str,
        password: &str,
    ) -> Result<Reply<User>> {
        let reply = api.login(email, password).await?;
        self.accept(reply).await
    }

    /// Creates an account. When the API hands back a credential the session begins right away,
    /// exactly as for `login`; otherwise the user is expected to log in.
    pub async fn register(
        &mut self,
        api: &mut FinanceApi,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Reply<Option<User>>> {
        let reply = api.register(full_name, email, password).await?;
        Ok(match reply {
            Reply::Success {
                data:
                    AuthData {
                        token: Some(token),
                        user,
                    },
                message,
            } => {
                let user = self.begin(token, user).await?;
                Reply::Success {
                    data: Some(user),
                    message,
                }
            }
            Reply::Success { message, .. } => Reply::Success {
                data: None,
                message,
            },
            Reply::Failure { message } => Reply::Failure { message },
        })
    }

    /// Restores a session from the durable credential by fetching the profile. Any failure ends
    /// the session.
    pub async fn hydrate(&mut self, api: &mut FinanceApi) -> Result<Hydration> {
        let credential = match self.stored_credential().await? {
            Some(credential) => credential,
            None => {
                self.session = None;
                return Ok(Hydration::NoCredential);
            }
        };
        let candidate = Session::new(credential, None);
        match api.profile(&candidate).await {
            Ok(Reply::Success { data: user, .. }) => {
                debug!("Restored the session of {}", user.email);
                self.session = Some(Session::new(candidate.credential, Some(user.clone())));
                Ok(Hydration::Restored(user))
            }
            Ok(Reply::Failure { message }) => {
                self.logout().await?;
                Ok(Hydration::Rejected(message))
            }
            Err(e) => {
                self.logout().await?;
                Ok(Hydration::Unreachable(format!("{e:#}")))
            }
        }
    }

    /// Clears the in-memory session and removes the durable credential.
    pub async fn logout(&mut self) -> Result<()> {
        self.session = None;
        utils::remove(&self.path).await
    }

    async fn accept(&mut self, reply: Reply<AuthData>) -> Result<Reply<User>> {
        Ok(match reply {
            Reply::Success {
                data:
                    AuthData {
                        token: Some(token),
                        user,
                    },
                message,
            } => Reply::Success {
                data: self.begin(token, user).await?,
                message,
            },
            Reply::Success { .. } => Reply::Failure {
                message: Some("The server did not return a credential".to_string()),
            },
            Reply::Failure { message } => Reply::Failure { message },
        })
    }

    async fn begin(&mut self, token: String, user: Option<User>) -> Result<User> {
        if let Some(dir) = self.path.parent() {
            utils::make_dir(dir).await?;
        }
        utils::write_secret(&self.path, &token).await?;
        let user = user.unwrap_or_default();
        self.session = Some(Session::new(token, Some(user.clone())));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestGateway, DEMO_EMAIL, DEMO_PASSWORD};
    use tempfile::TempDir;

    fn setup() -> (TempDir, SessionStore, FinanceApi, crate::api::TestGatewayHandle) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join(".secrets").join("credential"));
        let gateway = TestGateway::default();
        let handle = gateway.handle();
        (dir, store, FinanceApi::new(Box::new(gateway)), handle)
    }

    #[tokio::test]
    async fn test_login_stores_credential() {
        let (_dir, mut store, mut api, _handle) = setup();
        let reply = store.login(&mut api, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert!(reply.is_success());
        let session = store.session().unwrap();
        assert_eq!(
            store.stored_credential().await.unwrap().as_deref(),
            Some(session.credential())
        );
    }

    #[tokio::test]
    async fn test_bad_login_keeps_no_session() {
        let (_dir, mut store, mut api, _handle) = setup();
        let reply = store.login(&mut api, DEMO_EMAIL, "wrong").await.unwrap();
        assert!(matches!(reply, Reply::Failure { message: Some(_) }));
        assert!(!store.is_authenticated());
        assert!(store.stored_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_removes_credential() {
        let (_dir, mut store, mut api, _handle) = setup();
        store.login(&mut api, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        store.logout().await.unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.path().exists());
        store.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_hydrate_without_credential_sends_nothing() {
        let (_dir, mut store, mut api, handle) = setup();
        assert_eq!(store.hydrate(&mut api).await.unwrap(), Hydration::NoCredential);
        assert!(handle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_restores_identity() {
        let (dir, mut store, mut api, _handle) = setup();
        store.login(&mut api, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let mut fresh = SessionStore::new(dir.path().join(".secrets").join("credential"));
        let hydration = fresh.hydrate(&mut api).await.unwrap();
        assert!(matches!(hydration, Hydration::Restored(ref u) if u.email == DEMO_EMAIL));
        assert_eq!(fresh.session().unwrap().user().unwrap().email, DEMO_EMAIL);
    }

    #[tokio::test]
    async fn test_hydrate_rejected_credential_logs_out() {
        let (_dir, mut store, mut api, _handle) = setup();
        utils::make_dir(store.path().parent().unwrap()).await.unwrap();
        utils::write(store.path(), "forged").await.unwrap();

        let hydration = store.hydrate(&mut api).await.unwrap();
        assert!(matches!(hydration, Hydration::Rejected(_)));
        assert!(!store.is_authenticated());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_hydrate_offline_logs_out() {
        let (_dir, mut store, mut api, handle) = setup();
        store.login(&mut api, DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        handle.set_offline(true);

        let hydration = store.hydrate(&mut api).await.unwrap();
        assert!(matches!(hydration, Hydration::Unreachable(_)));
        assert!(store.stored_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_begins_session() {
        let (_dir, mut store, mut api, _handle) = setup();
        let reply = store
            .register(&mut api, "Grace Hopper", "grace@example.com", "cobol123")
            .await
            .unwrap();
        match reply {
            Reply::Success { data: Some(user), .. } => {
                assert_eq!(user.full_name.as_deref(), Some("Grace Hopper"))
            }
            other => panic!("unexpected reply {other:?}"),
        }
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_session_debug_redacts_credential() {
        let session = Session::new("super-secret", None);
        assert!(!format!("{session:?}").contains("super-secret"));
    }
}
