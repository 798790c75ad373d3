//! Transaction lifecycle: create, edit, delete.
//!
//! Each operation checks every input first (ownership of the transaction,
//! wallet and target) and only then writes. The transaction row and every
//! balance it touches are committed together.

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    LedgerChanges, ResultEngine, Transaction, TransactionFilter, TransactionIntent, rules,
    transactions, util::month_bounds,
};

use super::{Engine, PendingNotice, ledger::Deltas, with_tx};

impl Engine {
    /// Return a transaction snapshot from DB.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// List the user's transactions, newest first.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        user_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        let bounds = filter.month.map(month_bounds).transpose()?;
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()));
            if let Some(wallet_id) = filter.wallet_id {
                query = query.filter(transactions::Column::WalletId.eq(wallet_id));
            }
            if let Some(category_id) = filter.category_id {
                query = query.filter(transactions::Column::CategoryId.eq(category_id));
            }
            if let Some(saving_id) = filter.saving_id {
                query = query.filter(transactions::Column::SavingId.eq(saving_id));
            }
            if let Some(debt_id) = filter.debt_id {
                query = query.filter(transactions::Column::DebtId.eq(debt_id));
            }
            if let Some((start, end)) = bounds {
                query = query
                    .filter(transactions::Column::Date.gte(start))
                    .filter(transactions::Column::Date.lt(end));
            }
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let models = query
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }

    /// Record a new transaction and apply it to its wallet and target.
    pub async fn create_transaction(
        &self,
        intent: TransactionIntent,
        user_id: &str,
    ) -> ResultEngine<LedgerChanges> {
        intent.validate()?;
        let result: ResultEngine<(LedgerChanges, Vec<PendingNotice>)> = with_tx!(self, |db_tx| {
            self.find_wallet_owned(&db_tx, intent.wallet_id, user_id)
                .await?;
            let rule = self
                .rule_target(&db_tx, intent.target, user_id)
                .await?;

            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                wallet_id: intent.wallet_id,
                amount: intent.amount,
                description: intent.description,
                date: intent.date,
                target: intent.target,
            };

            let mut deltas = Deltas::default();
            deltas.record(&tx, rules::apply(tx.amount, rule))?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            let applied = self.apply_deltas(&db_tx, deltas, user_id).await?;

            tracing::info!(
                transaction_id = %tx.id,
                kind = tx.kind().as_str(),
                amount = %tx.amount,
                "transaction created"
            );
            let stored = self.reload_transaction(&db_tx, tx.id).await?;
            Ok(applied.into_changes(stored.unwrap_or(tx)))
        });
        let (changes, pending) = result?;

        self.dispatch_notifications(pending).await;
        Ok(changes)
    }

    /// Rewrite a transaction in place.
    ///
    /// The old effect is reversed and the new one applied; both are merged so
    /// each wallet, budget and goal is written once with the net change.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        intent: TransactionIntent,
        user_id: &str,
    ) -> ResultEngine<LedgerChanges> {
        intent.validate()?;
        let result: ResultEngine<(LedgerChanges, Vec<PendingNotice>)> = with_tx!(self, |db_tx| {
            let model = self
                .find_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;
            let existing = Transaction::try_from(model)?;

            self.find_wallet_owned(&db_tx, intent.wallet_id, user_id)
                .await?;
            let new_rule = self
                .rule_target(&db_tx, intent.target, user_id)
                .await?;
            let old_rule = self
                .rule_target(&db_tx, existing.target, user_id)
                .await?;

            let updated = Transaction {
                id: existing.id,
                user_id: existing.user_id.clone(),
                wallet_id: intent.wallet_id,
                amount: intent.amount,
                description: intent.description,
                date: intent.date,
                target: intent.target,
            };

            let mut deltas = Deltas::default();
            deltas.record(&existing, rules::reverse(existing.amount, old_rule))?;
            deltas.record(&updated, rules::apply(updated.amount, new_rule))?;

            transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;
            let applied = self.apply_deltas(&db_tx, deltas, user_id).await?;

            tracing::info!(
                %transaction_id,
                old_amount = %existing.amount,
                new_amount = %updated.amount,
                "transaction updated"
            );
            let stored = self.reload_transaction(&db_tx, updated.id).await?;
            Ok(applied.into_changes(stored.unwrap_or(updated)))
        });
        let (changes, pending) = result?;

        self.dispatch_notifications(pending).await;
        Ok(changes)
    }

    /// Undo a transaction and remove it.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<LedgerChanges> {
        let result: ResultEngine<(LedgerChanges, Vec<PendingNotice>)> = with_tx!(self, |db_tx| {
            let model = self
                .find_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;
            let existing = Transaction::try_from(model)?;
            let rule = self
                .rule_target(&db_tx, existing.target, user_id)
                .await?;

            let mut deltas = Deltas::default();
            deltas.record(&existing, rules::reverse(existing.amount, rule))?;

            transactions::Entity::delete_by_id(existing.id)
                .exec(&db_tx)
                .await?;
            let applied = self.apply_deltas(&db_tx, deltas, user_id).await?;

            tracing::info!(
                %transaction_id,
                amount = %existing.amount,
                "transaction deleted"
            );
            Ok(applied.into_changes(existing))
        });
        let (changes, pending) = result?;

        self.dispatch_notifications(pending).await;
        Ok(changes)
    }
}
