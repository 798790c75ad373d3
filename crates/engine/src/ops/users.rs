use sea_orm::{ActiveValue, PaginatorTrait, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Register a user. Every other row is owned through its username.
    pub async fn new_user(&self, username: &str) -> ResultEngine<String> {
        let username = normalize_required_name(username, "user")?;
        with_tx!(self, |db_tx| {
            let exists = users::Entity::find_by_id(username.clone())
                .count(&db_tx)
                .await?
                > 0;
            if exists {
                return Err(EngineError::Conflict(username));
            }

            users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(user_id = %username, "user created");
            Ok(username)
        })
    }

    /// Whether `username` is registered.
    pub async fn user_exists(&self, username: &str) -> ResultEngine<bool> {
        let count = users::Entity::find_by_id(username.to_string())
            .count(&self.database)
            .await?;
        Ok(count > 0)
    }
}
