use crate::error::TransportErrorKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Result of a single attempt. Any status code that came back is a `Success`;
/// deciding whether 200 or 401 means a valid login is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success {
        status: u16,
    },
    TransportError {
        kind: TransportErrorKind,
        message: String,
    },
}

/// Username-major, password-minor enumeration of every pair.
pub fn credential_pairs<'a>(
    usernames: &'a [String],
    passwords: &'a [String],
) -> impl Iterator<Item = Credential> + 'a {
    usernames.iter().flat_map(move |user| {
        passwords
            .iter()
            .map(move |pass| Credential::new(user.as_str(), pass.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairs_are_username_major() {
        let users = strings(&["alice", "bob"]);
        let passes = strings(&["1", "2", "3"]);

        let pairs: Vec<(String, String)> = credential_pairs(&users, &passes)
            .map(|c| (c.username, c.password))
            .collect();

        let expected: Vec<(String, String)> = [
            ("alice", "1"),
            ("alice", "2"),
            ("alice", "3"),
            ("bob", "1"),
            ("bob", "2"),
            ("bob", "3"),
        ]
        .iter()
        .map(|(u, p)| (u.to_string(), p.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let users = strings(&["root", "root"]);
        let passes = strings(&["toor"]);
        assert_eq!(credential_pairs(&users, &passes).count(), 2);
    }

    #[test]
    fn test_empty_side_yields_nothing() {
        let users = strings(&["alice"]);
        assert_eq!(credential_pairs(&users, &[]).count(), 0);
        assert_eq!(credential_pairs(&[], &users).count(), 0);
    }

    #[test]
    fn test_outcome_json_shape() {
        let ok = serde_json::to_value(AttemptOutcome::Success { status: 401 }).unwrap();
        assert_eq!(ok["outcome"], "success");
        assert_eq!(ok["status"], 401);

        let err = serde_json::to_value(AttemptOutcome::TransportError {
            kind: TransportErrorKind::Connect,
            message: "connection refused".to_string(),
        })
        .unwrap();
        assert_eq!(err["outcome"], "transport_error");
        assert_eq!(err["kind"], "connect");
    }
}
