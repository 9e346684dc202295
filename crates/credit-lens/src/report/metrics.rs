//! Derived credit metrics.
//!
//! Each metric resolves through an ordered list of candidate tiers. A tier
//! either produces a value or declines; the first value wins and the tier that
//! produced it is recorded in [`MetricsProvenance`]. When every tier declines
//! the metric takes its zero default.

use super::account::{CanonicalAccount, PaymentStatus};
use super::payload;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const TOTAL_OPEN_ACCOUNTS: &str = "totalOpenAccounts";
const REVOLVING_ACCOUNTS: &str = "revolvingAccounts";
const INSTALLMENT_ACCOUNTS: &str = "installmentAccounts";
const MORTGAGE_ACCOUNTS: &str = "mortgageAccounts";
const BALANCE: &str = "balance";
const CREDIT_LIMIT: &str = "creditLimit";
const DEBT_TO_CREDIT_RATIO: &str = "debtToCreditRatio";
const ACCOUNT_COUNT: &str = "accountCount";
const AVERAGE_ACCOUNT_AGE_MONTHS: &str = "averageAccountAgeMonths";

pub const DAYS_PER_MONTH: f64 = 30.0;

/// Tier that produced a derived metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// `summary.totalOpenAccounts` reported by the bureau.
    TotalOpenAccounts,
    /// `summary.revolvingAccounts` reported by the bureau.
    RevolvingAccounts,
    /// Other bureau summary fields (account counts, average age).
    BureauSummary,
    /// Per-account figures reported by the bureau.
    AccountFigures,
    /// Recomputed from canonical account records.
    Accounts,
    Default,
}

impl MetricSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalOpenAccounts => "bureau total open accounts",
            Self::RevolvingAccounts => "bureau revolving accounts",
            Self::BureauSummary => "bureau summary",
            Self::AccountFigures => "reported account figures",
            Self::Accounts => "account records",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsProvenance {
    pub total_balance: MetricSource,
    pub total_credit_limit: MetricSource,
    pub utilization_rate: MetricSource,
    pub total_accounts: MetricSource,
    pub on_time_percentage: MetricSource,
    pub average_account_age: MetricSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Balance over limit as a fraction; values above 1 mean over-limit.
    pub utilization_rate: f64,
    pub on_time_percentage: u32,
    pub total_accounts: u32,
    pub total_balance: f64,
    pub total_credit_limit: f64,
    /// Negative when balances exceed limits.
    pub available_credit: f64,
    pub average_account_age_months: u32,
    pub provenance: MetricsProvenance,
}

struct Resolved<T> {
    value: T,
    source: MetricSource,
}

type Tier<'a, T> = (MetricSource, &'a dyn Fn() -> Option<T>);

fn resolve<T: std::fmt::Debug>(
    metric: &'static str,
    tiers: &[Tier<'_, T>],
    default: T,
) -> Resolved<T> {
    let resolved = tiers
        .iter()
        .find_map(|(source, candidate)| {
            candidate().map(|value| Resolved {
                value,
                source: *source,
            })
        })
        .unwrap_or(Resolved {
            value: default,
            source: MetricSource::Default,
        });

    debug!(metric, source = ?resolved.source, value = ?resolved.value, "resolved credit metric");
    resolved
}

/// Derives the metric set for one bureau's accounts and summary.
///
/// `as_of` anchors account ages so repeated calls give identical output.
pub fn derive_metrics(
    accounts: &[CanonicalAccount],
    summary: Option<&Value>,
    as_of: NaiveDate,
) -> DerivedMetrics {
    let total_balance = resolve(
        "total_balance",
        &[
            (MetricSource::TotalOpenAccounts, &|| {
                summary_number(summary, TOTAL_OPEN_ACCOUNTS, BALANCE)
            }),
            (MetricSource::RevolvingAccounts, &|| {
                summary_number(summary, REVOLVING_ACCOUNTS, BALANCE)
            }),
            (MetricSource::Accounts, &|| sum_balances(accounts)),
        ],
        0.0,
    );

    let total_credit_limit = resolve(
        "total_credit_limit",
        &[
            (MetricSource::TotalOpenAccounts, &|| {
                summary_number(summary, TOTAL_OPEN_ACCOUNTS, CREDIT_LIMIT)
            }),
            (MetricSource::RevolvingAccounts, &|| {
                summary_number(summary, REVOLVING_ACCOUNTS, CREDIT_LIMIT)
            }),
            (MetricSource::Accounts, &|| sum_credit_limits(accounts)),
        ],
        0.0,
    );

    let totals_known = total_balance.source != MetricSource::Default
        || total_credit_limit.source != MetricSource::Default;
    // The local ratio is credited to wherever the totals it divides came from.
    let totals_source = if total_balance.source != MetricSource::Default {
        total_balance.source
    } else {
        total_credit_limit.source
    };
    let utilization_rate = resolve(
        "utilization_rate",
        &[
            (MetricSource::TotalOpenAccounts, &|| {
                summary_ratio(summary, TOTAL_OPEN_ACCOUNTS)
            }),
            (MetricSource::RevolvingAccounts, &|| {
                summary_ratio(summary, REVOLVING_ACCOUNTS)
            }),
            (totals_source, &|| {
                totals_known
                    .then(|| safe_ratio(total_balance.value, total_credit_limit.value))
            }),
        ],
        0.0,
    );

    let total_accounts = resolve(
        "total_accounts",
        &[
            (MetricSource::Accounts, &|| account_count(accounts)),
            (MetricSource::BureauSummary, &|| summary_account_count(summary)),
        ],
        0,
    );

    let on_time_percentage = resolve(
        "on_time_percentage",
        &[
            (MetricSource::AccountFigures, &|| {
                reported_on_time_percentage(accounts)
            }),
            (MetricSource::Accounts, &|| payment_history_on_time_percentage(accounts)),
        ],
        0,
    );

    let average_account_age = resolve(
        "average_account_age",
        &[
            (MetricSource::BureauSummary, &|| summary_average_age(summary)),
            (MetricSource::Accounts, &|| average_age_months(accounts, as_of)),
        ],
        0,
    );

    DerivedMetrics {
        utilization_rate: finite_or_zero(utilization_rate.value),
        on_time_percentage: on_time_percentage.value,
        total_accounts: total_accounts.value,
        total_balance: finite_or_zero(total_balance.value),
        total_credit_limit: finite_or_zero(total_credit_limit.value),
        available_credit: finite_or_zero(total_credit_limit.value - total_balance.value),
        average_account_age_months: average_account_age.value,
        provenance: MetricsProvenance {
            total_balance: total_balance.source,
            total_credit_limit: total_credit_limit.source,
            utilization_rate: utilization_rate.source,
            total_accounts: total_accounts.source,
            on_time_percentage: on_time_percentage.source,
            average_account_age: average_account_age.source,
        },
    }
}

fn summary_number(summary: Option<&Value>, block: &str, field: &str) -> Option<f64> {
    summary.and_then(|summary| payload::number_at(summary, &[block, field]))
}

fn summary_ratio(summary: Option<&Value>, block: &str) -> Option<f64> {
    summary_number(summary, block, DEBT_TO_CREDIT_RATIO).map(|ratio| ratio / 100.0)
}

fn summary_account_count(summary: Option<&Value>) -> Option<u32> {
    let counts: Vec<f64> = [REVOLVING_ACCOUNTS, INSTALLMENT_ACCOUNTS, MORTGAGE_ACCOUNTS]
        .into_iter()
        .filter_map(|block| summary_number(summary, block, ACCOUNT_COUNT))
        .collect();

    (!counts.is_empty()).then(|| to_whole(counts.iter().sum()))
}

fn summary_average_age(summary: Option<&Value>) -> Option<u32> {
    summary
        .and_then(|summary| payload::number_at(summary, &[AVERAGE_ACCOUNT_AGE_MONTHS]))
        .map(to_whole)
}

fn sum_balances(accounts: &[CanonicalAccount]) -> Option<f64> {
    (!accounts.is_empty()).then(|| accounts.iter().map(|account| account.balance).sum())
}

fn sum_credit_limits(accounts: &[CanonicalAccount]) -> Option<f64> {
    (!accounts.is_empty()).then(|| {
        accounts
            .iter()
            .map(|account| account.credit_limit.unwrap_or(0.0))
            .sum()
    })
}

fn account_count(accounts: &[CanonicalAccount]) -> Option<u32> {
    match u32::try_from(accounts.len()) {
        Ok(0) => None,
        Ok(count) => Some(count),
        Err(_) => Some(u32::MAX),
    }
}

/// Mean of the bureau-supplied percentages over only the accounts that carry one.
fn reported_on_time_percentage(accounts: &[CanonicalAccount]) -> Option<u32> {
    let figures: Vec<f64> = accounts
        .iter()
        .filter_map(|account| account.on_time_percentage)
        .collect();

    if figures.is_empty() {
        return None;
    }

    let mean = safe_ratio(figures.iter().sum(), figures.len() as f64);
    Some(to_percentage(mean))
}

/// Share of current entries among all entries with a known status.
fn payment_history_on_time_percentage(accounts: &[CanonicalAccount]) -> Option<u32> {
    let (on_time, countable) = accounts
        .iter()
        .flat_map(|account| account.payment_history.iter())
        .fold((0usize, 0usize), |(on_time, countable), status| match status {
            PaymentStatus::Current => (on_time + 1, countable + 1),
            PaymentStatus::Unknown => (on_time, countable),
            PaymentStatus::Late | PaymentStatus::Missed => (on_time, countable + 1),
        });

    (countable > 0).then(|| to_percentage(safe_ratio(on_time as f64, countable as f64) * 100.0))
}

/// Mean account age in 30-day months over accounts with a known open date.
/// Open dates after `as_of` count as age zero.
fn average_age_months(accounts: &[CanonicalAccount], as_of: NaiveDate) -> Option<u32> {
    let ages: Vec<f64> = accounts
        .iter()
        .filter_map(|account| account.opened_on)
        .map(|opened_on| (as_of - opened_on).num_days().max(0) as f64)
        .collect();

    if ages.is_empty() {
        return None;
    }

    let mean_days = safe_ratio(ages.iter().sum(), ages.len() as f64);
    Some(to_whole(mean_days / DAYS_PER_MONTH))
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn to_whole(value: f64) -> u32 {
    let rounded = finite_or_zero(value).round();
    if rounded <= 0.0 {
        0
    } else if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

fn to_percentage(value: f64) -> u32 {
    to_whole(value).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::account::AccountKind;
    use serde_json::json;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid as-of date")
    }

    fn account(balance: f64, credit_limit: Option<f64>) -> CanonicalAccount {
        CanonicalAccount {
            kind: AccountKind::Revolving,
            creditor_name: None,
            status: None,
            balance,
            credit_limit,
            opened_on: None,
            payment_history: Vec::new(),
            on_time_percentage: None,
        }
    }

    #[test]
    fn bureau_ratio_wins_over_local_totals() {
        let summary = json!({ "totalOpenAccounts": { "debtToCreditRatio": 40 } });
        let accounts = vec![account(900.0, Some(1000.0))];

        let metrics = derive_metrics(&accounts, Some(&summary), as_of());
        assert_eq!(metrics.utilization_rate, 0.40);
        assert_eq!(
            metrics.provenance.utilization_rate,
            MetricSource::TotalOpenAccounts
        );
    }

    #[test]
    fn revolving_summary_is_second_tier() {
        let summary = json!({
            "totalOpenAccounts": { "accountCount": 3 },
            "revolvingAccounts": { "balance": 1200, "creditLimit": "4,000", "debtToCreditRatio": 30 }
        });

        let metrics = derive_metrics(&[], Some(&summary), as_of());
        assert_eq!(metrics.total_balance, 1200.0);
        assert_eq!(metrics.total_credit_limit, 4000.0);
        assert_eq!(metrics.available_credit, 2800.0);
        assert_eq!(metrics.utilization_rate, 0.30);
        assert_eq!(metrics.provenance.total_balance, MetricSource::RevolvingAccounts);
    }

    #[test]
    fn utilization_recomputes_from_accounts() {
        let accounts = vec![account(100.0, Some(500.0)), account(200.0, Some(500.0))];

        let metrics = derive_metrics(&accounts, None, as_of());
        assert_eq!(metrics.total_balance, 300.0);
        assert_eq!(metrics.total_credit_limit, 1000.0);
        assert_eq!(metrics.utilization_rate, 0.30);
        assert_eq!(metrics.available_credit, 700.0);
        assert_eq!(metrics.provenance.utilization_rate, MetricSource::Accounts);
    }

    #[test]
    fn zero_limit_yields_zero_utilization() {
        let accounts = vec![account(250.0, None), account(0.0, Some(0.0))];

        let metrics = derive_metrics(&accounts, None, as_of());
        assert_eq!(metrics.utilization_rate, 0.0);
        assert!(metrics.utilization_rate.is_finite());
        assert_eq!(metrics.available_credit, -250.0);
    }

    #[test]
    fn local_totals_use_resolved_bureau_values() {
        let summary = json!({ "totalOpenAccounts": { "balance": 600, "creditLimit": 400 } });

        let metrics = derive_metrics(&[], Some(&summary), as_of());
        assert_eq!(metrics.utilization_rate, 1.5);
        assert_eq!(metrics.available_credit, -200.0);
        assert_eq!(
            metrics.provenance.utilization_rate,
            MetricSource::TotalOpenAccounts
        );
    }

    #[test]
    fn bureau_totals_without_ratio_credit_the_bureau() {
        let summary = json!({ "totalOpenAccounts": { "balance": 900, "creditLimit": 1000 } });
        let accounts = vec![account(100.0, Some(1000.0))];

        let metrics = derive_metrics(&accounts, Some(&summary), as_of());
        assert_eq!(metrics.utilization_rate, 0.9);
        assert_eq!(
            metrics.provenance.utilization_rate,
            MetricSource::TotalOpenAccounts
        );
    }

    #[test]
    fn empty_inputs_default_to_zero() {
        let metrics = derive_metrics(&[], None, as_of());
        assert_eq!(metrics.utilization_rate, 0.0);
        assert_eq!(metrics.on_time_percentage, 0);
        assert_eq!(metrics.total_accounts, 0);
        assert_eq!(metrics.total_balance, 0.0);
        assert_eq!(metrics.total_credit_limit, 0.0);
        assert_eq!(metrics.available_credit, 0.0);
        assert_eq!(metrics.average_account_age_months, 0);
        assert_eq!(metrics.provenance.utilization_rate, MetricSource::Default);
        assert_eq!(metrics.provenance.total_accounts, MetricSource::Default);
    }

    #[test]
    fn account_count_precedes_summary_counts() {
        let summary = json!({
            "revolvingAccounts": { "accountCount": 4 },
            "installmentAccounts": { "accountCount": "2" },
            "mortgageAccounts": { "accountCount": 1 }
        });

        let metrics = derive_metrics(&[], Some(&summary), as_of());
        assert_eq!(metrics.total_accounts, 7);
        assert_eq!(metrics.provenance.total_accounts, MetricSource::BureauSummary);

        let accounts = vec![account(10.0, None), account(20.0, None)];
        let metrics = derive_metrics(&accounts, Some(&summary), as_of());
        assert_eq!(metrics.total_accounts, 2);
        assert_eq!(metrics.provenance.total_accounts, MetricSource::Accounts);
    }

    #[test]
    fn on_time_uses_payment_entries_when_no_figures() {
        let mut first = account(0.0, None);
        first.payment_history = vec![PaymentStatus::Current, PaymentStatus::Current];
        let mut second = account(0.0, None);
        second.payment_history = vec![PaymentStatus::Late, PaymentStatus::Unknown];

        let metrics = derive_metrics(&[first, second], None, as_of());
        assert_eq!(metrics.on_time_percentage, 67);
        assert_eq!(metrics.provenance.on_time_percentage, MetricSource::Accounts);
    }

    #[test]
    fn on_time_averages_only_accounts_with_figures() {
        let mut reported = account(0.0, None);
        reported.on_time_percentage = Some(90.0);
        let mut also_reported = account(0.0, None);
        also_reported.on_time_percentage = Some(95.0);
        let mut history_only = account(0.0, None);
        history_only.payment_history = vec![PaymentStatus::Missed; 4];

        let metrics = derive_metrics(&[reported, also_reported, history_only], None, as_of());
        assert_eq!(metrics.on_time_percentage, 93);
        assert_eq!(
            metrics.provenance.on_time_percentage,
            MetricSource::AccountFigures
        );
    }

    #[test]
    fn only_unknown_entries_give_zero_on_time() {
        let mut unknown = account(0.0, None);
        unknown.payment_history = vec![PaymentStatus::Unknown; 3];

        let metrics = derive_metrics(&[unknown], None, as_of());
        assert_eq!(metrics.on_time_percentage, 0);
        assert_eq!(metrics.provenance.on_time_percentage, MetricSource::Default);
    }

    #[test]
    fn average_age_prefers_summary_then_open_dates() {
        let mut older = account(0.0, None);
        older.opened_on = Some(as_of() - chrono::Duration::days(900));
        let mut newer = account(0.0, None);
        newer.opened_on = Some(as_of() - chrono::Duration::days(300));
        let undated = account(0.0, None);
        let accounts = vec![older, newer, undated];

        let metrics = derive_metrics(&accounts, None, as_of());
        assert_eq!(metrics.average_account_age_months, 20);

        let summary = json!({ "averageAccountAgeMonths": 47.6 });
        let metrics = derive_metrics(&accounts, Some(&summary), as_of());
        assert_eq!(metrics.average_account_age_months, 48);
        assert_eq!(
            metrics.provenance.average_account_age,
            MetricSource::BureauSummary
        );
    }

    #[test]
    fn future_open_dates_count_as_new() {
        let mut future = account(0.0, None);
        future.opened_on = Some(as_of() + chrono::Duration::days(45));

        let metrics = derive_metrics(&[future], None, as_of());
        assert_eq!(metrics.average_account_age_months, 0);
    }

    #[test]
    fn derivation_is_idempotent() {
        let summary = json!({ "revolvingAccounts": { "balance": 10, "creditLimit": 30 } });
        let mut dated = account(10.0, Some(30.0));
        dated.opened_on = NaiveDate::from_ymd_opt(2020, 1, 15);
        let accounts = vec![dated];

        let first = derive_metrics(&accounts, Some(&summary), as_of());
        let second = derive_metrics(&accounts, Some(&summary), as_of());
        assert_eq!(first, second);
        assert_eq!(
            first.utilization_rate.to_bits(),
            second.utilization_rate.to_bits()
        );
    }
}
