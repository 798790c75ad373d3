//! Balance update rules.
//!
//! Pure functions computing how much a transaction moves each running total it
//! touches. Nothing here reads or writes the database; the lifecycle code in
//! `ops` looks up the rows, asks these rules for an [`Effect`] and persists the
//! result.
//!
//! Sign conventions:
//!
//! - income category: the wallet gains `amount`
//! - expense category: the wallet loses `amount`
//! - savings or debt: the wallet always loses `amount` and the goal gains it
//! - budgets accumulate the magnitude `|amount|` in both category cases

use crate::Money;

/// What a transaction settles against, reduced to what the rules need.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleTarget {
    Category { is_income: bool },
    Saving,
    Debt,
}

/// Deltas produced by a single transaction.
///
/// `budget` applies to every budget matching the transaction scope, `goal` to
/// the routed saving or debt. A field that does not apply is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    pub wallet: Money,
    pub budget: Money,
    pub goal: Money,
}

impl Effect {
    /// Exact inverse: `apply + reverse` nets every delta to zero.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            wallet: -self.wallet,
            budget: -self.budget,
            goal: -self.goal,
        }
    }
}

/// Effect of applying a transaction of `amount` to `target`.
#[must_use]
pub fn apply(amount: Money, target: RuleTarget) -> Effect {
    match target {
        RuleTarget::Category { is_income } => Effect {
            wallet: if is_income { amount } else { -amount },
            budget: amount.abs(),
            goal: Money::ZERO,
        },
        RuleTarget::Saving | RuleTarget::Debt => Effect {
            wallet: -amount,
            budget: Money::ZERO,
            goal: amount,
        },
    }
}

/// Effect of undoing a transaction previously applied with [`apply`].
#[must_use]
pub fn reverse(amount: Money, target: RuleTarget) -> Effect {
    apply(amount, target).inverse()
}

/// Whether a goal with `balance` has reached `goal`.
#[must_use]
pub fn is_goal_met(balance: Money, goal: Money) -> bool {
    balance >= goal
}
