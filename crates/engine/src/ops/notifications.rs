use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Notification, ResultEngine, notifications};

use super::{Engine, with_tx};

impl Engine {
    /// The user's notifications, newest first.
    ///
    /// Dismissed ones are left out unless `include_dismissed` is set.
    pub async fn notifications(
        &self,
        include_dismissed: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            let mut query = notifications::Entity::find()
                .filter(notifications::Column::UserId.eq(user_id.to_string()));
            if !include_dismissed {
                query = query.filter(notifications::Column::Dismissed.eq(false));
            }
            query
                .order_by_desc(notifications::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Notification::try_from)
                .collect()
        })
    }

    /// Mark a notification as seen. Dismissing twice keeps the first time.
    pub async fn dismiss_notification(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Notification> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_notification_owned(&db_tx, notification_id, user_id)
                .await?;
            if model.dismissed {
                return Notification::try_from(model);
            }

            let model = notifications::ActiveModel {
                id: ActiveValue::Set(notification_id),
                dismissed: ActiveValue::Set(true),
                dismissed_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Notification::try_from(model)
        })
    }
}
