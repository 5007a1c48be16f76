use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("Please fill in all fields.")]
    MissingField,

    #[error("Use a valid email.")]
    InvalidEmail,
}

/// Raw identity fields as typed into the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDraft {
    pub email: String,
    pub twitter: String,
    pub whatsapp: String,
}

impl IdentityDraft {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        twitter: impl Into<String>,
        whatsapp: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            twitter: twitter.into(),
            whatsapp: whatsapp.into(),
        }
    }

    /// Validate the draft into an `Identity`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingField` if any field is blank, and
    /// `IdentityError::InvalidEmail` if the email lacks an `@` or a dotted
    /// domain.
    pub fn validate(self) -> Result<Identity, IdentityError> {
        if self.email.trim().is_empty()
            || self.twitter.trim().is_empty()
            || self.whatsapp.trim().is_empty()
        {
            return Err(IdentityError::MissingField);
        }
        if !is_valid_email(&self.email) {
            return Err(IdentityError::InvalidEmail);
        }

        Ok(Identity {
            email: self.email,
            twitter: self.twitter,
            whatsapp: self.whatsapp,
        })
    }
}

/// Contact details captured once before the quiz starts. Immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    email: String,
    twitter: String,
    whatsapp: String,
}

impl Identity {
    /// Rehydrate an identity from persisted storage.
    ///
    /// # Errors
    ///
    /// Applies the same validation as `IdentityDraft::validate`.
    pub fn from_persisted(
        email: impl Into<String>,
        twitter: impl Into<String>,
        whatsapp: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        IdentityDraft::new(email, twitter, whatsapp).validate()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn twitter(&self) -> &str {
        &self.twitter
    }

    #[must_use]
    pub fn whatsapp(&self) -> &str {
        &self.whatsapp
    }
}

/// Mirrors the `\S+@\S+\.\S+` check: no whitespace, an `@`, and a dotted
/// domain with text on both sides of the dot.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_draft_produces_identity() {
        let identity = IdentityDraft::new("a@b.com", "x", "y").validate().unwrap();
        assert_eq!(identity.email(), "a@b.com");
        assert_eq!(identity.twitter(), "x");
        assert_eq!(identity.whatsapp(), "y");
    }

    #[test]
    fn blank_field_is_rejected() {
        let err = IdentityDraft::new("a@b.com", "  ", "y")
            .validate()
            .unwrap_err();
        assert_eq!(err, IdentityError::MissingField);
    }

    #[test]
    fn email_without_at_is_rejected() {
        let err = IdentityDraft::new("ab.com", "x", "y").validate().unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        let err = IdentityDraft::new("a@bcom", "x", "y").validate().unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
    }

    #[test]
    fn email_with_trailing_dot_is_rejected() {
        let err = IdentityDraft::new("a@b.", "x", "y").validate().unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
    }

    #[test]
    fn email_with_whitespace_is_rejected() {
        let err = IdentityDraft::new("a @b.com", "x", "y")
            .validate()
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
    }

    #[test]
    fn validation_error_messages_are_user_facing() {
        assert_eq!(
            IdentityError::MissingField.to_string(),
            "Please fill in all fields."
        );
        assert_eq!(IdentityError::InvalidEmail.to_string(), "Use a valid email.");
    }
}
