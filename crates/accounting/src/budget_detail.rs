//! Budget line: the budgeted and actual amount for one account within a budget.
//!
//! Pure data entity. It queues no events; the owning budget's handlers roll
//! the lines up into budget totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coopledger_core::{
    AnnotationLimits, Annotations, AuditInfo, DomainError, DomainResult, Entity,
    MAX_ANNOTATION_LENGTH,
};

use crate::ids::{AccountId, BudgetDetailId, BudgetId};
use crate::money;

const ANNOTATION_LIMITS: AnnotationLimits = AnnotationLimits::new(500, MAX_ANNOTATION_LENGTH);

/// Entity: BudgetDetail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetDetail {
    id: BudgetDetailId,
    budget_id: BudgetId,
    account_id: AccountId,
    budgeted_amount: Decimal,
    actual_amount: Decimal,
    annotations: Annotations,
    audit: AuditInfo,
}

/// Fields a caller may change on an existing line. `None` leaves a field as is.
/// The budget and account a line belongs to are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetDetailUpdate {
    pub budgeted_amount: Option<Decimal>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Persisted shape of a [`BudgetDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDetailRecord {
    pub id: BudgetDetailId,
    pub budget_id: BudgetId,
    pub account_id: AccountId,
    pub budgeted_amount: Decimal,
    pub actual_amount: Decimal,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

impl BudgetDetail {
    /// Create a budget line. Actuals start at zero.
    pub fn create(
        budget_id: BudgetId,
        account_id: AccountId,
        budgeted_amount: Decimal,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        let budgeted_amount = money::ensure_non_negative("budgeted amount", budgeted_amount)?;
        let annotations = Annotations::new(description, notes, ANNOTATION_LIMITS)?;

        let detail = Self {
            id: BudgetDetailId::new(),
            budget_id,
            account_id,
            budgeted_amount,
            actual_amount: Decimal::ZERO,
            annotations,
            audit: AuditInfo::default(),
        };
        debug!(budget_detail_id = %detail.id, %budget_id, %budgeted_amount, "budget detail created");
        Ok(detail)
    }

    /// Apply the supplied changes. Every supplied field is validated before any
    /// of them is applied.
    pub fn update(&mut self, changes: BudgetDetailUpdate) -> DomainResult<&mut Self> {
        let budgeted_amount = changes
            .budgeted_amount
            .map(|amount| money::ensure_non_negative("budgeted amount", amount))
            .transpose()?;
        let annotations = self.annotations.revised(
            changes.description.as_deref(),
            changes.notes.as_deref(),
            ANNOTATION_LIMITS,
        )?;

        if let Some(amount) = budgeted_amount {
            self.budgeted_amount = amount;
        }
        self.annotations = annotations;
        Ok(self)
    }

    /// Record the actual amount posted against this line. Actuals may exceed
    /// the budget or be negative (reversals); there is no constraint.
    pub fn update_actual(&mut self, actual_amount: Decimal) -> &mut Self {
        if self.actual_amount != actual_amount {
            debug!(budget_detail_id = %self.id, old = %self.actual_amount, new = %actual_amount, "budget actual updated");
            self.actual_amount = actual_amount;
        }
        self
    }

    /// Budgeted − actual. Positive means under budget.
    ///
    /// Fails with `InvalidOperation` when the difference does not fit in a
    /// `Decimal`.
    pub fn variance(&self) -> DomainResult<Decimal> {
        self.budgeted_amount
            .checked_sub(self.actual_amount)
            .ok_or_else(|| DomainError::invalid_operation("budget variance overflow"))
    }

    /// Variance as a percentage of the budgeted amount; 0 when nothing was budgeted.
    pub fn variance_percentage(&self) -> DomainResult<Decimal> {
        if self.budgeted_amount.is_zero() {
            return Ok(Decimal::ZERO);
        }
        self.variance()?
            .checked_div(self.budgeted_amount)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| DomainError::invalid_operation("budget variance percentage overflow"))
    }

    pub fn id_typed(&self) -> BudgetDetailId {
        self.id
    }

    pub fn budget_id(&self) -> BudgetId {
        self.budget_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn budgeted_amount(&self) -> Decimal {
        self.budgeted_amount
    }

    pub fn actual_amount(&self) -> Decimal {
        self.actual_amount
    }

    pub fn description(&self) -> Option<&str> {
        self.annotations.description()
    }

    pub fn notes(&self) -> Option<&str> {
        self.annotations.notes()
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    pub fn to_record(&self) -> BudgetDetailRecord {
        BudgetDetailRecord {
            id: self.id,
            budget_id: self.budget_id,
            account_id: self.account_id,
            budgeted_amount: self.budgeted_amount,
            actual_amount: self.actual_amount,
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation. Persistence layer only.
    pub fn rehydrate(record: BudgetDetailRecord) -> Self {
        Self {
            id: record.id,
            budget_id: record.budget_id,
            account_id: record.account_id,
            budgeted_amount: record.budgeted_amount,
            actual_amount: record.actual_amount,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
        }
    }
}

impl Entity for BudgetDetail {
    type Id = BudgetDetailId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn detail(budgeted: Decimal) -> BudgetDetail {
        BudgetDetail::create(BudgetId::new(), AccountId::new(), budgeted, None, None).unwrap()
    }

    #[test]
    fn create_starts_with_zero_actuals() {
        let detail = BudgetDetail::create(
            BudgetId::new(),
            AccountId::new(),
            dec!(5000.00),
            Some("  Line maintenance "),
            None,
        )
        .unwrap();

        assert_eq!(detail.budgeted_amount(), dec!(5000.00));
        assert_eq!(detail.actual_amount(), Decimal::ZERO);
        assert_eq!(detail.description(), Some("Line maintenance"));
    }

    #[test]
    fn create_rejects_negative_budget() {
        let err = BudgetDetail::create(BudgetId::new(), AccountId::new(), dec!(-1), None, None)
            .unwrap_err();
        assert_eq!(err, DomainError::validation("budgeted amount cannot be negative"));
    }

    #[test]
    fn zero_budget_is_allowed() {
        assert_eq!(detail(dec!(0)).budgeted_amount(), Decimal::ZERO);
    }

    #[test]
    fn variance_tracks_actuals() {
        let mut detail = detail(dec!(1000));
        detail.update_actual(dec!(1250));

        assert_eq!(detail.variance().unwrap(), dec!(-250));
        assert_eq!(detail.variance_percentage().unwrap(), dec!(-25));

        detail.update_actual(dec!(900));
        assert_eq!(detail.variance().unwrap(), dec!(100));
        assert_eq!(detail.variance_percentage().unwrap(), dec!(10));
    }

    #[test]
    fn variance_overflow_is_an_error() {
        let mut huge = detail(Decimal::MAX);
        huge.update_actual(dec!(-1));
        assert_eq!(
            huge.variance().unwrap_err(),
            DomainError::invalid_operation("budget variance overflow")
        );
        assert!(huge.variance_percentage().unwrap_err().is_invalid_operation());

        let mut tiny = detail(dec!(0.01));
        tiny.update_actual(-(Decimal::MAX / dec!(4)));
        assert!(tiny.variance().is_ok());
        assert_eq!(
            tiny.variance_percentage().unwrap_err(),
            DomainError::invalid_operation("budget variance percentage overflow")
        );
    }

    #[test]
    fn description_is_capped_at_five_hundred() {
        let long = "d".repeat(501);
        let err =
            BudgetDetail::create(BudgetId::new(), AccountId::new(), dec!(1), Some(&long), None)
                .unwrap_err();
        assert_eq!(err, DomainError::validation("description cannot exceed 500 characters"));

        let notes = "n".repeat(MAX_ANNOTATION_LENGTH);
        let mut line = detail(dec!(1));
        line
            .update(BudgetDetailUpdate {
                notes: Some(notes.clone()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(line.notes(), Some(notes.as_str()));

        let before = line.clone();
        let err = line
            .update(BudgetDetailUpdate {
                budgeted_amount: Some(dec!(2)),
                description: Some(long),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(line, before);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut detail = detail(dec!(1000));
        let before = detail.clone();

        let err = detail
            .update(BudgetDetailUpdate {
                budgeted_amount: Some(dec!(-10)),
                notes: Some("revised".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(detail, before);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let mut detail = detail(dec!(1000));
        let account_id = detail.account_id();

        detail
            .update(BudgetDetailUpdate {
                budgeted_amount: Some(dec!(1200)),
                description: Some("Vehicle fuel".to_string()),
                ..Default::default()
            })
            .unwrap()
            .update_actual(dec!(300));

        assert_eq!(detail.account_id(), account_id);
        assert_eq!(detail.budgeted_amount(), dec!(1200));
        assert_eq!(detail.description(), Some("Vehicle fuel"));
        assert_eq!(detail.actual_amount(), dec!(300));
    }

    #[test]
    fn record_round_trip_preserves_state() {
        let mut detail = detail(dec!(750.50));
        detail.update_actual(dec!(10));
        let restored = BudgetDetail::rehydrate(detail.to_record());
        assert_eq!(restored, detail);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: with nothing budgeted, the variance percentage is zero no
        /// matter what the actuals are.
        #[test]
        fn zero_budget_has_zero_variance_percentage(actual_cents in any::<i64>()) {
            let mut detail = detail(Decimal::ZERO);
            detail.update_actual(Decimal::new(actual_cents, 2));
            prop_assert_eq!(detail.variance_percentage(), Ok(Decimal::ZERO));
        }
    }
}
