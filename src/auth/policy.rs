use std::collections::HashSet;

use crate::auth::user::AuthenticatedUser;

/// Decides who may use the admin panel.
///
/// Membership is checked against a server-side allow-list of emails. Entries
/// and candidate emails are trimmed and compared case-insensitively. The
/// user's metadata role is not consulted.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    /// Build a policy from a comma-separated list such as `"a@x.com, B@X.COM"`.
    pub fn from_allow_list(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(normalize_email)
            .filter(|email| !email.is_empty())
            .collect();
        Self { emails }
    }

    /// Whether `user` is an administrator. Anonymous users never are.
    pub fn is_admin(&self, user: Option<&AuthenticatedUser>) -> bool {
        match user {
            Some(user) => {
                let email = normalize_email(&user.email);
                !email.is_empty() && self.emails.contains(&email)
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
