use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, budgets, categories, notifications, transactions, users,
    util::name_key, wallets,
};

use super::Engine;

/// Generates a `find_*_owned` method for an entity with a `user_id` column.
///
/// A missing row is `NotFound`, a row of another user is `Forbidden`.
macro_rules! impl_find_owned {
    ($fn_name:ident, $entity:path, $model:path, $label:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$model> {
            let model = <$entity>::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($label.to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::Forbidden($label.to_string()));
            }
            Ok(model)
        }
    };
}

/// Generates a `*_name_exists` method checking the per-user unique name.
macro_rules! impl_name_exists {
    ($fn_name:ident, $entity:path, $id_col:expr, $user_col:expr, $norm_col:expr) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            name: &str,
            exclude: Option<Uuid>,
            user_id: &str,
        ) -> ResultEngine<bool> {
            let mut query = <$entity>::find()
                .filter($user_col.eq(user_id.to_string()))
                .filter($norm_col.eq(name_key(name)));
            if let Some(id) = exclude {
                query = query.filter($id_col.ne(id));
            }
            Ok(query.count(db).await? > 0)
        }
    };
}

impl Engine {
    impl_find_owned!(
        find_wallet_owned,
        wallets::Entity,
        wallets::Model,
        "wallet"
    );

    impl_find_owned!(
        find_category_owned,
        categories::Entity,
        categories::Model,
        "category"
    );

    impl_find_owned!(
        find_budget_owned,
        budgets::Entity,
        budgets::Model,
        "budget"
    );

    impl_find_owned!(
        find_transaction_owned,
        transactions::Entity,
        transactions::Model,
        "transaction"
    );

    impl_find_owned!(
        find_notification_owned,
        notifications::Entity,
        notifications::Model,
        "notification"
    );

    impl_name_exists!(
        wallet_name_exists,
        wallets::Entity,
        wallets::Column::Id,
        wallets::Column::UserId,
        wallets::Column::NameNorm
    );

    impl_name_exists!(
        category_name_exists,
        categories::Entity,
        categories::Column::Id,
        categories::Column::UserId,
        categories::Column::NameNorm
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(user_id.to_string())
            .count(db)
            .await?
            > 0;
        if !exists {
            return Err(EngineError::NotFound("user".to_string()));
        }
        Ok(())
    }
}
