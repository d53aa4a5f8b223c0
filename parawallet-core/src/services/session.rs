//! Session manager - the single owner of the current session
//!
//! Holds the in-memory session and mirrors it into [`SessionStorage`].
//! Hydrated once at startup; torn down on logout.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::{Session, SessionState};
use crate::ports::{SessionStorage, TOKEN_KEY, USER_KEY};

/// Session manager
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    /// Rebuild the session from storage.
    ///
    /// A stored pair with one half missing (or blank) is not a session: the
    /// leftover entry is removed and the manager starts logged out.
    pub fn init_from_storage(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let token = storage.get(TOKEN_KEY)?;
        let user = storage.get(USER_KEY)?;

        let current = match (token, user) {
            (Some(token), Some(user)) => match Session::new(token, user) {
                Ok(session) => Some(session),
                Err(_) => {
                    clear_storage(storage.as_ref())?;
                    None
                }
            },
            (None, None) => None,
            _ => {
                clear_storage(storage.as_ref())?;
                None
            }
        };

        Ok(Self {
            storage,
            current: Mutex::new(current),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Session>>> {
        self.current
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))
    }

    /// Current session, if logged in
    pub fn current(&self) -> Option<Session> {
        self.lock().ok().and_then(|s| s.clone())
    }

    pub fn state(&self) -> SessionState {
        self.current().into()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Bearer token for authenticated calls
    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token().to_string())
    }

    /// Install a new session, persisting it first.
    ///
    /// If persisting fails, storage is put back to the previous session so
    /// memory and disk still agree. If even that fails, both sides drop to
    /// logged out.
    pub fn establish(&self, session: Session) -> Result<()> {
        let mut current = self.lock()?;

        if let Err(e) = self.persist(&session) {
            let restored = match current.as_ref() {
                Some(previous) => self.persist(previous),
                None => clear_storage(self.storage.as_ref()),
            };
            if restored.is_err() {
                *current = None;
                let _ = clear_storage(self.storage.as_ref());
            }
            return Err(e);
        }

        *current = Some(session);
        Ok(())
    }

    fn persist(&self, session: &Session) -> Result<()> {
        self.storage.set(TOKEN_KEY, session.token())?;
        self.storage.set(USER_KEY, session.account_identifier())?;
        Ok(())
    }

    /// Drop the session from memory and storage.
    ///
    /// Memory is always cleared; a storage failure is still returned so the
    /// caller can report it.
    pub fn teardown(&self) -> Result<()> {
        let mut current = self.lock()?;
        *current = None;
        clear_storage(self.storage.as_ref())
    }
}

fn clear_storage(storage: &dyn SessionStorage) -> Result<()> {
    let token = storage.remove(TOKEN_KEY);
    let user = storage.remove(USER_KEY);
    token.and(user)
}
