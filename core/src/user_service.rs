use crate::{
    access::Caller,
    error::{QueryError, QueryResult},
    model::User,
    store::EntityStore,
    types::EntityKind,
};
use std::sync::Arc;

pub struct UserService {
    store: Arc<EntityStore>,
}

impl UserService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// The caller's own user record.
    pub fn current_user(&self, caller: &Caller) -> QueryResult<User> {
        match self.store.user(&caller.user_id)? {
            Some(user) => Ok(user),
            None => {
                log::warn!("User not found: user_id={}", caller.user_id);
                Err(QueryError::not_found(EntityKind::User, &caller.user_id))
            }
        }
    }
}
