use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, budgets, categories, transactions, util::name_key,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_category_owned(&db_tx, category_id, user_id)
                .await?;
            Ok(Category::from(model))
        })
    }

    /// List the user's categories ordered by name.
    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Category::from).collect::<Vec<_>>())
        })
    }

    pub async fn new_category(
        &self,
        name: &str,
        is_income: bool,
        user_id: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if self.category_name_exists(&db_tx, &name, None, user_id).await? {
                return Err(EngineError::Conflict(name));
            }

            let category = Category::new(name, is_income, user_id);
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;

            tracing::info!(category_id = %category.id, is_income, "category created");
            Ok(category)
        })
    }

    /// Rename a category and/or flip its income flag.
    ///
    /// The flag can only change while no transaction uses the category: the
    /// wallet effect of existing transactions was computed with the old sign.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: Option<&str>,
        is_income: Option<bool>,
        user_id: &str,
    ) -> ResultEngine<Category> {
        let name = name
            .map(|value| normalize_required_name(value, "category"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self
                .find_category_owned(&db_tx, category_id, user_id)
                .await?;
            if name.is_none() && is_income.is_none() {
                return Ok(Category::from(model));
            }

            if let Some(name) = &name
                && self
                    .category_name_exists(&db_tx, name, Some(category_id), user_id)
                    .await?
            {
                return Err(EngineError::Conflict(name.clone()));
            }

            if let Some(is_income) = is_income
                && is_income != model.is_income
            {
                let used = transactions::Entity::find()
                    .filter(transactions::Column::CategoryId.eq(category_id))
                    .count(&db_tx)
                    .await?
                    > 0;
                if used {
                    return Err(EngineError::Validation(
                        "cannot change income/expense of a category with transactions"
                            .to_string(),
                    ));
                }
            }

            let mut active = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name_norm = ActiveValue::Set(name_key(&name));
                active.name = ActiveValue::Set(name);
            }
            if let Some(is_income) = is_income {
                active.is_income = ActiveValue::Set(is_income);
            }
            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Delete a category together with its budgets and transactions.
    ///
    /// Wallet balances are not reversed for the removed transactions.
    pub async fn delete_category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.find_category_owned(&db_tx, category_id, user_id)
                .await?;

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(
                %category_id,
                transactions = removed.rows_affected,
                "category deleted"
            );
            Ok(())
        })
    }
}
