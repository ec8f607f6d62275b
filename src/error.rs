// Domain errors reported by the record store and query layer

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store, query and stats operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required field is missing or empty
    #[error("{0}")]
    Validation(String),

    /// A unique field collides with an existing record
    #[error("{field} already exists: {value}")]
    DuplicateKey { field: &'static str, value: String },

    /// No record with the given id
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    /// Anything that is not one of the domain failures above
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// HTTP status code the surrounding API layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::DuplicateKey { .. } => 400,
            StoreError::NotFound { .. } => 404,
            StoreError::Internal(_) => 500,
        }
    }

    /// Human-readable message for the response envelope
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation(msg) => msg.clone(),
            StoreError::DuplicateKey { field, .. } => format!("{} already exists", capitalize(field)),
            StoreError::NotFound { kind, .. } => format!("{} not found", capitalize(kind)),
            StoreError::Internal(_) => "Server error".to_string(),
        }
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::Validation("x".to_string()).status_code(), 400);
        assert_eq!(
            StoreError::DuplicateKey {
                field: "email",
                value: "a@x.com".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(StoreError::NotFound { kind: "post", id: 9 }.status_code(), 404);
        assert_eq!(StoreError::Internal("boom".to_string()).status_code(), 500);
    }

    #[test]
    fn test_user_messages() {
        let dup = StoreError::DuplicateKey {
            field: "email",
            value: "a@x.com".to_string(),
        };
        assert_eq!(dup.user_message(), "Email already exists");
        assert_eq!(dup.to_string(), "email already exists: a@x.com");

        let missing = StoreError::NotFound { kind: "user", id: 3 };
        assert_eq!(missing.user_message(), "User not found");
        assert_eq!(missing.to_string(), "user not found: 3");

        assert_eq!(StoreError::Internal("boom".to_string()).user_message(), "Server error");
    }
}
