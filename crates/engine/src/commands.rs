//! Command structs for engine operations.
//!
//! These types group parameters for write operations and list queries,
//! keeping call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, GoalKind, Money, ResultEngine, TargetRef, util};

/// Raw transaction fields as submitted by a form.
///
/// Every field is optional text. A field that is missing, blank or holds the
/// literal `"none"` (what an unselected dropdown sends) counts as absent. Turn
/// it into a typed [`TransactionIntent`] with [`TransactionForm::parse`].
#[derive(Clone, Debug, Default)]
pub struct TransactionForm {
    pub wallet: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub saving: Option<String>,
    pub debt: Option<String>,
}

impl TransactionForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn wallet(mut self, value: impl Into<String>) -> Self {
        self.wallet = Some(value.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, value: impl Into<String>) -> Self {
        self.amount = Some(value.into());
        self
    }

    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    #[must_use]
    pub fn date(mut self, value: impl Into<String>) -> Self {
        self.date = Some(value.into());
        self
    }

    #[must_use]
    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    #[must_use]
    pub fn saving(mut self, value: impl Into<String>) -> Self {
        self.saving = Some(value.into());
        self
    }

    #[must_use]
    pub fn debt(mut self, value: impl Into<String>) -> Self {
        self.debt = Some(value.into());
        self
    }

    /// Validate the raw fields.
    ///
    /// `today` is used when no date was submitted. Only the shape of the input
    /// is checked here; existence and ownership of the referenced rows are
    /// checked by the engine.
    pub fn parse(self, today: NaiveDate) -> ResultEngine<TransactionIntent> {
        let category = present(self.category.as_deref());
        let saving = present(self.saving.as_deref());
        let debt = present(self.debt.as_deref());

        let target = match (category, saving, debt) {
            (None, None, None) => return Err(EngineError::Validation("no target".to_string())),
            (Some(id), None, None) => TargetRef::Category(parse_id(id, "category")?),
            (None, Some(id), None) => TargetRef::Saving(parse_id(id, "saving")?),
            (None, None, Some(id)) => TargetRef::Debt(parse_id(id, "debt")?),
            _ => {
                return Err(EngineError::Validation(
                    "only one of category, saving or debt may be selected".to_string(),
                ));
            }
        };

        let wallet = present(self.wallet.as_deref())
            .ok_or_else(|| EngineError::Validation("wallet is required".to_string()))?;
        let wallet_id = parse_id(wallet, "wallet")?;

        let amount = present(self.amount.as_deref())
            .ok_or_else(|| EngineError::Validation("amount is required".to_string()))?
            .parse::<Money>()?;

        let date = match present(self.date.as_deref()) {
            Some(value) => util::parse_date(value)?,
            None => today,
        };

        let intent = TransactionIntent {
            wallet_id,
            amount,
            description: util::normalize_optional_text(self.description.as_deref())
                .unwrap_or_default(),
            date,
            target,
        };
        intent.validate()?;
        Ok(intent)
    }
}

/// Longest description a transaction may carry, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 150;

fn present(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
}

fn parse_id(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// A validated request to create or rewrite a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionIntent {
    pub wallet_id: Uuid,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub target: TargetRef,
}

impl TransactionIntent {
    #[must_use]
    pub fn new(wallet_id: Uuid, amount: Money, date: NaiveDate, target: TargetRef) -> Self {
        Self {
            wallet_id,
            amount,
            description: String::new(),
            date,
            target,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::Validation(format!(
                "description longer than {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Filters for transaction lists. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub saving_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
    /// Any date inside the wanted month.
    pub month: Option<NaiveDate>,
    pub limit: Option<u64>,
}

impl TransactionFilter {
    #[must_use]
    pub fn wallet(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn saving(mut self, saving_id: Uuid) -> Self {
        self.saving_id = Some(saving_id);
        self
    }

    #[must_use]
    pub fn debt(mut self, debt_id: Uuid) -> Self {
        self.debt_id = Some(debt_id);
        self
    }

    #[must_use]
    pub fn month(mut self, date: NaiveDate) -> Self {
        self.month = Some(date);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Create a saving or a debt.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub kind: GoalKind,
    pub name: String,
    pub goal: Money,
    pub due_date: Option<NaiveDate>,
    pub notify_on_completion: bool,
    pub delete_on_completion: bool,
    pub hidden: bool,
    pub is_receiving: bool,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(kind: GoalKind, name: impl Into<String>, goal: Money) -> Self {
        Self {
            kind,
            name: name.into(),
            goal,
            due_date: None,
            notify_on_completion: true,
            delete_on_completion: false,
            hidden: false,
            is_receiving: false,
        }
    }

    #[must_use]
    pub fn saving(name: impl Into<String>, goal: Money) -> Self {
        Self::new(GoalKind::Saving, name, goal)
    }

    #[must_use]
    pub fn debt(name: impl Into<String>, goal: Money) -> Self {
        Self::new(GoalKind::Debt, name, goal)
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn notify_on_completion(mut self, notify: bool) -> Self {
        self.notify_on_completion = notify;
        self
    }

    #[must_use]
    pub fn delete_on_completion(mut self, delete: bool) -> Self {
        self.delete_on_completion = delete;
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn is_receiving(mut self, is_receiving: bool) -> Self {
        self.is_receiving = is_receiving;
        self
    }
}

/// Partial update of a saving or a debt. `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub goal: Option<Money>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<NaiveDate>>,
    pub notify_on_completion: Option<bool>,
    pub delete_on_completion: Option<bool>,
    pub hidden: Option<bool>,
    pub is_receiving: Option<bool>,
}

impl GoalUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn goal(mut self, goal: Money) -> Self {
        self.goal = Some(goal);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn notify_on_completion(mut self, notify: bool) -> Self {
        self.notify_on_completion = Some(notify);
        self
    }

    #[must_use]
    pub fn delete_on_completion(mut self, delete: bool) -> Self {
        self.delete_on_completion = Some(delete);
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    #[must_use]
    pub fn is_receiving(mut self, is_receiving: bool) -> Self {
        self.is_receiving = Some(is_receiving);
        self
    }
}

/// Which goals a list should leave out.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoalFilter {
    pub hide_hidden: bool,
    pub hide_completed: bool,
}

/// Partial update of a budget. `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct BudgetUpdate {
    pub goal: Option<Money>,
    pub category_id: Option<Uuid>,
    pub wallet_id: Option<Uuid>,
}

impl BudgetUpdate {
    #[must_use]
    pub fn goal(mut self, goal: Money) -> Self {
        self.goal = Some(goal);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn wallet(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn parse_category_form() {
        let wallet = Uuid::new_v4();
        let category = Uuid::new_v4();

        let intent = TransactionForm::new()
            .wallet(wallet.to_string())
            .amount("10,50")
            .description("  Groceries run ")
            .category(category.to_string())
            .saving("none")
            .debt("")
            .parse(today())
            .unwrap();

        assert_eq!(intent.wallet_id, wallet);
        assert_eq!(intent.amount, Money::from_cents(1050));
        assert_eq!(intent.description, "Groceries run");
        assert_eq!(intent.date, today());
        assert_eq!(intent.target, TargetRef::Category(category));
    }

    #[test]
    fn parse_requires_exactly_one_target() {
        let form = TransactionForm::new()
            .wallet(Uuid::new_v4().to_string())
            .amount("5");

        assert_eq!(
            form.clone().parse(today()).unwrap_err(),
            EngineError::Validation("no target".to_string())
        );

        let both = form
            .category(Uuid::new_v4().to_string())
            .saving(Uuid::new_v4().to_string());
        assert!(matches!(
            both.parse(today()),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_fields() {
        let base = TransactionForm::new()
            .wallet(Uuid::new_v4().to_string())
            .debt(Uuid::new_v4().to_string());

        assert!(base.clone().amount("ten").parse(today()).is_err());
        assert!(base.clone().parse(today()).is_err());
        assert!(
            base.clone()
                .amount("1")
                .date("2024-13-01")
                .parse(today())
                .is_err()
        );
        assert!(
            TransactionForm::new()
                .wallet("not-a-uuid")
                .amount("1")
                .category(Uuid::new_v4().to_string())
                .parse(today())
                .is_err()
        );

        let intent = base.amount("1").date("2024-02-29").parse(today()).unwrap();
        assert_eq!(intent.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(intent.target.kind(), crate::TargetKind::Debt);
    }

    #[test]
    fn description_is_capped() {
        let form = TransactionForm::new()
            .wallet(Uuid::new_v4().to_string())
            .amount("1")
            .category(Uuid::new_v4().to_string());

        let longest = "é".repeat(MAX_DESCRIPTION_LEN);
        let intent = form.clone().description(longest.clone()).parse(today()).unwrap();
        assert_eq!(intent.description, longest);

        assert_eq!(
            form.description("x".repeat(MAX_DESCRIPTION_LEN + 1))
                .parse(today()),
            Err(EngineError::Validation(
                "description longer than 150 characters".to_string()
            ))
        );
    }
}
