use std::sync::{Arc, PoisonError, RwLock};

/// Token and identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

/// In-memory credential holder shared by the API client and the application.
///
/// Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: AuthSession) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_slot() {
        let credentials = Credentials::new();
        let shared = credentials.clone();
        credentials.set(AuthSession {
            token: "abc".into(),
            user_id: 7,
            username: "dev".into(),
        });
        assert_eq!(shared.token().as_deref(), Some("abc"));

        shared.clear();
        assert!(!credentials.is_authenticated());
        assert_eq!(credentials.token(), None);
    }
}
