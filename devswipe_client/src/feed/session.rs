use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const RANDOM_SUFFIX_LEN: usize = 9;

/// Opaque id correlating one browsing session's interactions server-side.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    current: Option<String>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session id, generating it on first use.
    pub fn ensure(&mut self) -> String {
        self.current.get_or_insert_with(generate_session_id).clone()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent_until_reset() {
        let mut identity = SessionIdentity::new();
        assert_eq!(identity.current(), None);

        let first = identity.ensure();
        for _ in 0..10 {
            assert_eq!(identity.ensure(), first);
        }

        identity.reset();
        assert_eq!(identity.current(), None);
        let second = identity.ensure();
        assert_ne!(first, second);
    }

    #[test]
    fn ids_carry_time_and_random_parts() {
        let id = SessionIdentity::new().ensure();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), RANDOM_SUFFIX_LEN);
    }
}
