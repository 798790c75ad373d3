use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, Wallet, budgets, transactions, util::name_key,
    util::normalize_required_name, wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, wallet_id: Uuid, user_id: &str) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;
            Wallet::try_from(model)
        })
    }

    /// List the user's wallets ordered by name.
    pub async fn wallets(&self, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            let models = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(wallets::Column::NameNorm)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Wallet::try_from).collect()
        })
    }

    /// Add a new wallet.
    ///
    /// `opening` becomes the starting balance as is; it is not recorded as a
    /// transaction.
    pub async fn new_wallet(
        &self,
        name: &str,
        opening: Money,
        user_id: &str,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if self.wallet_name_exists(&db_tx, &name, None, user_id).await? {
                return Err(EngineError::Conflict(name));
            }

            let wallet = Wallet::new(name, opening, user_id);
            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            tracing::info!(wallet_id = %wallet.id, balance = %wallet.balance, "wallet created");
            Ok(wallet)
        })
    }

    /// Renames an existing wallet.
    pub async fn rename_wallet(
        &self,
        wallet_id: Uuid,
        new_name: &str,
        user_id: &str,
    ) -> ResultEngine<Wallet> {
        let new_name = normalize_required_name(new_name, "wallet")?;
        with_tx!(self, |db_tx| {
            self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;
            if self
                .wallet_name_exists(&db_tx, &new_name, Some(wallet_id), user_id)
                .await?
            {
                return Err(EngineError::Conflict(new_name));
            }

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id),
                name_norm: ActiveValue::Set(name_key(&new_name)),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Wallet::try_from(model)
        })
    }

    /// Overwrite the wallet balance, e.g. after reconciling with the bank.
    ///
    /// Transactions are left untouched, so the new value becomes the base the
    /// ledger keeps moving from.
    pub async fn set_wallet_balance(
        &self,
        wallet_id: Uuid,
        balance: Money,
        user_id: &str,
    ) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id),
                balance: ActiveValue::Set(balance.to_db()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;

            tracing::info!(%wallet_id, %balance, "wallet balance set");
            Wallet::try_from(model)
        })
    }

    /// Delete a wallet together with its transactions and budgets.
    ///
    /// The removed transactions are not reversed: savings and debts they fed
    /// keep their balance.
    pub async fn delete_wallet(&self, wallet_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_by_id(wallet_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(
                %wallet_id,
                transactions = removed.rows_affected,
                "wallet deleted"
            );
            Ok(())
        })
    }
}
