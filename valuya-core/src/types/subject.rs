use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The kind of caller a [`Subject`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    /// An authenticated user, resolved from the authorizer context.
    User,
    /// An anonymous caller.
    Anon,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::User => "user",
            SubjectType::Anon => "anon",
        }
    }
}

impl Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved caller identity for one guarded invocation.
///
/// Displays as its canonical key, `type:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    pub id: String,
}

impl Subject {
    pub fn user(id: impl Into<String>) -> Self {
        Subject {
            subject_type: SubjectType::User,
            id: id.into(),
        }
    }

    pub fn anon(id: impl Into<String>) -> Self {
        Subject {
            subject_type: SubjectType::Anon,
            id: id.into(),
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subject_type, self.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_subject_wire_shape() {
        let subject = Subject::user("u-1");
        assert_eq!(
            serde_json::to_value(&subject).unwrap(),
            json!({"type": "user", "id": "u-1"})
        );
        assert_eq!(subject.to_string(), "user:u-1");
    }

    #[test]
    fn test_anon_subject_from_wire() {
        let subject: Subject = serde_json::from_value(json!({"type": "anon", "id": "abc"})).unwrap();
        assert_eq!(subject, Subject::anon("abc"));
    }
}
