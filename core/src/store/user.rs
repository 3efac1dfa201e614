use super::EntityStore;
use crate::{error::QueryResult, model::User};

impl EntityStore {
    // ── User ──────────────────────────────────────────────────────

    pub fn user(&self, user_id: &str) -> QueryResult<Option<User>> {
        let inner = self.read()?;
        Ok(inner.user_idx.get(user_id).map(|&i| inner.users[i].clone()))
    }

    /// First user in snapshot order with this email.
    pub fn user_by_email(&self, email: &str) -> QueryResult<Option<User>> {
        let inner = self.read()?;
        Ok(inner.email_idx.get(email).map(|&i| inner.users[i].clone()))
    }
}
