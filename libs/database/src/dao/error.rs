use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Key used for errors that cannot be attributed to a single field.
pub const BODY_FIELD: &str = "_body";

/// Field path to messages, e.g. `"user_detail.firstname" => ["must not be empty"]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Moves every entry of `other` under `prefix.`
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            let path = format!("{prefix}.{field}");
            self.0.entry(path).or_default().extend(messages);
        }
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    fn collect(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{field}"),
                None => field.to_string(),
            };
            match kind {
                ValidationErrorsKind::Field(failures) => {
                    for failure in failures {
                        let message = failure
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("failed `{}` check", failure.code));
                        self.add(path.clone(), message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(Some(&path), nested),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(Some(&format!("{path}[{index}]")), nested);
                    }
                }
            }
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Self::new();
        fields.collect(None, &errors);
        fields
    }
}

impl From<serde_json::Error> for FieldErrors {
    /// Serde reports missing and unknown fields by name; everything else
    /// (type mismatches, malformed documents) lands on [`BODY_FIELD`].
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let field = quoted_field(&message, "missing field `")
            .or_else(|| quoted_field(&message, "unknown field `"))
            .unwrap_or(BODY_FIELD);
        let message = match message.find(" at line ") {
            Some(end) => message[..end].to_string(),
            None => message.clone(),
        };
        Self::single(field, message)
    }
}

fn quoted_field<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let start = message.find(marker)? + marker.len();
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Failure of a resource operation
#[derive(Debug, Error)]
pub enum DaoError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

impl DaoError {
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<DbErr> for DaoError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Conflict(detail),
            _ => Self::Database(err),
        }
    }
}

impl From<ValidationErrors> for DaoError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl From<serde_json::Error> for DaoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Signup {
        #[validate(email(message = "must be a valid email address"))]
        email: String,
        #[validate(length(min = 8, message = "must be at least 8 characters"))]
        password: String,
        #[validate(nested)]
        profile: Profile,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Profile {
        #[validate(length(max = 5))]
        nickname: String,
    }

    #[test]
    fn test_validation_errors_flatten_to_dotted_paths() {
        let signup = Signup {
            email: "nope".into(),
            password: "short".into(),
            profile: Profile {
                nickname: "far too long".into(),
            },
        };

        let errors = FieldErrors::from(signup.validate().unwrap_err());

        assert_eq!(
            errors.get("email"),
            Some(&["must be a valid email address".to_string()][..])
        );
        assert!(errors.contains("password"));
        assert_eq!(
            errors.get("profile.nickname"),
            Some(&["failed `length` check".to_string()][..])
        );
    }

    #[test]
    fn test_serde_missing_field_is_attributed() {
        let err = serde_json::from_value::<Signup>(serde_json::json!({ "email": "a@b.co" }))
            .unwrap_err();
        let errors = FieldErrors::from(err);
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_serde_unknown_field_is_attributed() {
        let err = serde_json::from_value::<Signup>(serde_json::json!({
            "email": "a@b.co",
            "password": "long enough",
            "profile": { "nickname": "ok" },
            "is_admin": true,
        }))
        .unwrap_err();
        assert!(FieldErrors::from(err).contains("is_admin"));
    }

    #[test]
    fn test_serde_type_mismatch_lands_on_body() {
        let err = serde_json::from_value::<Signup>(serde_json::json!({ "email": 5 })).unwrap_err();
        let errors = FieldErrors::from(err);
        assert!(errors.contains(BODY_FIELD));
    }

    #[test]
    fn test_extend_prefixed_and_display() {
        let mut errors = FieldErrors::single("email", "is required");
        errors.extend_prefixed("user_detail", FieldErrors::single("firstname", "too long"));

        assert!(errors.contains("user_detail.firstname"));
        assert_eq!(
            errors.to_string(),
            "email: is required; user_detail.firstname: too long"
        );
    }

    #[test]
    fn test_plain_db_error_stays_database() {
        let err = DaoError::from(DbErr::RecordNotInserted);
        assert!(matches!(err, DaoError::Database(_)));
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_not_found_message() {
        let err = DaoError::not_found("user", 7);
        assert_eq!(err.to_string(), "user 7 not found");
    }
}
