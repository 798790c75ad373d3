//! Stored notifications shown to the user until dismissed.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, NotificationKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Presentation hint (`"success"`, ...).
    pub alert: String,
    pub created_at: DateTime<Utc>,
    pub dismissed: bool,
    pub dismissed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub alert: String,
    pub created_at: DateTimeUtc,
    pub dismissed: bool,
    pub dismissed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Notification> for ActiveModel {
    fn from(value: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            title: ActiveValue::Set(value.title.clone()),
            body: ActiveValue::Set(value.body.clone()),
            alert: ActiveValue::Set(value.alert.clone()),
            created_at: ActiveValue::Set(value.created_at),
            dismissed: ActiveValue::Set(value.dismissed),
            dismissed_at: ActiveValue::Set(value.dismissed_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            user_id: model.user_id,
            title: model.title,
            body: model.body,
            alert: model.alert,
            created_at: model.created_at,
            dismissed: model.dismissed,
            dismissed_at: model.dismissed_at,
        })
    }
}
