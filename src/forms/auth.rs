use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::forms::{empty_string_as_none, trimmed};

const PASSWORD_MIN_LEN: u64 = 6;

#[derive(Debug, Error)]
pub enum AuthFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Normalized email/password pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Page to return to after signing in.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub redirect: Option<String>,
}

impl LoginForm {
    pub fn into_credentials(self) -> Result<(Credentials, Option<String>), AuthFormError> {
        self.validate()?;
        let redirect = self.redirect.as_deref().and_then(local_redirect);
        Ok((
            Credentials {
                email: normalize_email(&self.email),
                password: self.password,
            },
            redirect,
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(email)]
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[validate(length(min = PASSWORD_MIN_LEN))]
    pub password: String,
}

impl SignUpForm {
    pub fn into_credentials(self) -> Result<Credentials, AuthFormError> {
        self.validate()?;
        Ok(Credentials {
            email: normalize_email(&self.email),
            password: self.password,
        })
    }
}

/// Accept only same-site absolute paths as post-login targets.
pub fn local_redirect(target: &str) -> Option<String> {
    let target = target.trim();
    let is_local = target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control);
    is_local.then(|| target.to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_normalizes_email_and_keeps_local_redirect() {
        let form = LoginForm {
            email: "Owner@Naxos.test".to_string(),
            password: "secret".to_string(),
            redirect: Some("/admin/categories".to_string()),
        };

        let (credentials, redirect) = form.into_credentials().expect("valid form");

        assert_eq!(credentials.email, "owner@naxos.test");
        assert_eq!(redirect.as_deref(), Some("/admin/categories"));
    }

    #[test]
    fn login_form_drops_foreign_redirects() {
        for target in ["https://evil.test", "//evil.test", "/\\evil.test", "admin"] {
            let form = LoginForm {
                email: "owner@naxos.test".to_string(),
                password: "secret".to_string(),
                redirect: Some(target.to_string()),
            };

            let (_, redirect) = form.into_credentials().expect("valid form");

            assert!(redirect.is_none(), "{target} should be rejected");
        }
    }

    #[test]
    fn login_form_requires_email() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
            redirect: None,
        };

        assert!(form.into_credentials().is_err());
    }

    #[test]
    fn login_form_accepts_padded_email() {
        let form: LoginForm =
            serde_html_form::from_str("email=+Owner%40Naxos.test+&password=secret&redirect=")
                .expect("parse");

        let (credentials, redirect) = form.into_credentials().expect("valid form");

        assert_eq!(credentials.email, "owner@naxos.test");
        assert!(redirect.is_none());
    }

    #[test]
    fn sign_up_form_accepts_padded_email() {
        let form: SignUpForm =
            serde_html_form::from_str("email=%09new%40naxos.test%20&password=123456")
                .expect("parse");

        let credentials = form.into_credentials().expect("valid form");

        assert_eq!(credentials.email, "new@naxos.test");
    }

    #[test]
    fn sign_up_form_enforces_password_length() {
        let form = SignUpForm {
            email: "new@naxos.test".to_string(),
            password: "12345".to_string(),
        };

        assert!(form.into_credentials().is_err());
    }
}
