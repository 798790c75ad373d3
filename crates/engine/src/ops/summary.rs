use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{Budget, Money, ResultEngine, categories, transactions, util::month_bounds};

use super::{Engine, with_tx};

/// Dashboard data for one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// First day of the month.
    pub month: NaiveDate,
    pub budgets: Vec<Budget>,
    /// One entry per category, including categories without transactions.
    pub categories: Vec<CategoryTotal>,
    pub income: Money,
    pub expenses: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub is_income: bool,
    pub count: u64,
    /// Sum of the signed amounts.
    pub total: Money,
}

impl Engine {
    /// Budgets and per-category totals of the month containing `month`.
    pub async fn month_summary(&self, month: NaiveDate, user_id: &str) -> ResultEngine<MonthSummary> {
        let (start, end) = month_bounds(month)?;
        with_tx!(self, |db_tx| {
            let budgets = self.budgets_of_month(&db_tx, start, user_id).await?;

            let categories = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?;

            let rows = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .filter(transactions::Column::CategoryId.is_not_null())
                .filter(transactions::Column::Date.gte(start))
                .filter(transactions::Column::Date.lt(end))
                .all(&db_tx)
                .await?;

            let mut per_category: HashMap<Uuid, (u64, Money)> = HashMap::new();
            for row in rows {
                let Some(category_id) = row.category_id else {
                    continue;
                };
                let amount = Money::from_db(&row.amount, "transaction amount")?;
                let entry = per_category.entry(category_id).or_insert((0, Money::ZERO));
                entry.0 += 1;
                entry.1 += amount;
            }

            let mut income = Money::ZERO;
            let mut expenses = Money::ZERO;
            let totals = categories
                .into_iter()
                .map(|category| {
                    let (count, total) = per_category
                        .get(&category.id)
                        .copied()
                        .unwrap_or((0, Money::ZERO));
                    if category.is_income {
                        income += total;
                    } else {
                        expenses += total;
                    }
                    CategoryTotal {
                        category_id: category.id,
                        name: category.name,
                        is_income: category.is_income,
                        count,
                        total,
                    }
                })
                .collect();

            Ok(MonthSummary {
                month: start,
                budgets,
                categories: totals,
                income,
                expenses,
            })
        })
    }
}
