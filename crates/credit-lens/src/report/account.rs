use super::bureau::BureauSelector;
use super::flatten::flatten_tagged_accounts;
use super::payload;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Revolving,
    Installment,
    Mortgage,
}

impl AccountKind {
    /// Kinds in the order their collections are flattened out of a provider view.
    pub const fn ordered() -> [Self; 3] {
        [Self::Revolving, Self::Installment, Self::Mortgage]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Revolving => "Revolving",
            Self::Installment => "Installment",
            Self::Mortgage => "Mortgage",
        }
    }
}

/// Status of one month in an account's payment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Current,
    Late,
    Missed,
    Unknown,
}

impl PaymentStatus {
    /// Maps a bureau status code; unrecognised codes become `Unknown`.
    pub fn from_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "current" | "c" | "ok" | "on_time" | "ontime" | "paid" | "0" => Self::Current,
            "30" | "60" | "90" | "120" | "150" | "180" => Self::Late,
            "missed" | "charge_off" | "chargeoff" | "co" | "collection" | "repossession" => {
                Self::Missed
            }
            late if late.starts_with("late") => Self::Late,
            _ => Self::Unknown,
        }
    }

    fn from_entry(entry: &Value) -> Self {
        let code = match entry {
            Value::String(code) => Some(code.as_str()),
            Value::Number(number) => {
                // 30.0 and 30 are the same code.
                let code = number
                    .as_f64()
                    .filter(|value| value.is_finite() && value.fract() == 0.0)
                    .map(|value| format!("{value:.0}"))
                    .unwrap_or_else(|| number.to_string());
                return Self::from_code(&code);
            }
            Value::Object(_) => payload::str_at(entry, &["status"]),
            _ => None,
        };

        code.map(Self::from_code).unwrap_or(Self::Unknown)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Late => "Late",
            Self::Missed => "Missed",
            Self::Unknown => "Unknown",
        }
    }
}

/// Normalized shape of one raw bureau account record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalAccount {
    pub kind: AccountKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub balance: f64,
    pub credit_limit: Option<f64>,
    pub opened_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_history: Vec<PaymentStatus>,
    pub on_time_percentage: Option<f64>,
}

impl CanonicalAccount {
    /// Builds the canonical account from a raw record; wrong types fall back to defaults.
    pub fn from_raw(kind: AccountKind, raw: &Value) -> Self {
        let credit_limit = payload::number_at(raw, &["creditLimit"])
            .or_else(|| payload::number_at(raw, &["highCredit"]));

        let payment_history = payload::array_at(raw, &["paymentHistory"])
            .map(|entries| entries.iter().map(PaymentStatus::from_entry).collect())
            .unwrap_or_default();

        Self {
            kind,
            creditor_name: payload::str_at(raw, &["creditorName"]).map(str::to_string),
            status: payload::str_at(raw, &["accountStatus"]).map(str::to_string),
            balance: payload::number_at(raw, &["balance"]).unwrap_or(0.0),
            credit_limit,
            opened_on: payload::date_at(raw, &["dateOpened"]),
            payment_history,
            on_time_percentage: payload::number_at(raw, &["onTimePaymentPercentage"]),
        }
    }

    pub fn available_credit(&self) -> Option<f64> {
        self.credit_limit.map(|limit| limit - self.balance)
    }
}

/// Flattens and canonicalizes every account admitted by `selector`.
pub fn canonical_accounts(
    report: Option<&Value>,
    selector: BureauSelector,
) -> Vec<CanonicalAccount> {
    flatten_tagged_accounts(report, selector)
        .into_iter()
        .map(|(kind, raw)| CanonicalAccount::from_raw(kind, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_codes_map_to_statuses() {
        assert_eq!(PaymentStatus::from_code("Current"), PaymentStatus::Current);
        assert_eq!(PaymentStatus::from_code(" ok "), PaymentStatus::Current);
        assert_eq!(PaymentStatus::from_code("30"), PaymentStatus::Late);
        assert_eq!(PaymentStatus::from_code("late-60"), PaymentStatus::Late);
        assert_eq!(PaymentStatus::from_code("Charge Off"), PaymentStatus::Missed);
        assert_eq!(PaymentStatus::from_code("missed"), PaymentStatus::Missed);
        assert_eq!(PaymentStatus::from_code(""), PaymentStatus::Unknown);
        assert_eq!(PaymentStatus::from_code("-"), PaymentStatus::Unknown);
    }

    #[test]
    fn raw_account_is_canonicalized() {
        let raw = json!({
            "creditorName": "Harbor Bank Visa",
            "accountStatus": "Open",
            "balance": "1,250.00",
            "creditLimit": 5000,
            "dateOpened": "2018-06-01",
            "paymentHistory": ["current", { "status": "30" }, { "status": null }, 0],
            "onTimePaymentPercentage": 96
        });

        let account = CanonicalAccount::from_raw(AccountKind::Revolving, &raw);
        assert_eq!(account.creditor_name.as_deref(), Some("Harbor Bank Visa"));
        assert_eq!(account.status.as_deref(), Some("Open"));
        assert_eq!(account.balance, 1250.0);
        assert_eq!(account.credit_limit, Some(5000.0));
        assert_eq!(account.opened_on, NaiveDate::from_ymd_opt(2018, 6, 1));
        assert_eq!(
            account.payment_history,
            vec![
                PaymentStatus::Current,
                PaymentStatus::Late,
                PaymentStatus::Unknown,
                PaymentStatus::Current
            ]
        );
        assert_eq!(account.on_time_percentage, Some(96.0));
        assert_eq!(account.available_credit(), Some(3750.0));
    }

    #[test]
    fn whole_number_float_entries_map_like_integers() {
        let raw = json!({ "paymentHistory": [30.0, 0.0, 60, 30.5, "C"] });

        let account = CanonicalAccount::from_raw(AccountKind::Revolving, &raw);
        assert_eq!(
            account.payment_history,
            vec![
                PaymentStatus::Late,
                PaymentStatus::Current,
                PaymentStatus::Late,
                PaymentStatus::Unknown,
                PaymentStatus::Current
            ]
        );
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let raw = json!({
            "balance": { "amount": 10 },
            "highCredit": 18000,
            "dateOpened": "sometime",
            "paymentHistory": "CCCC"
        });

        let account = CanonicalAccount::from_raw(AccountKind::Installment, &raw);
        assert_eq!(account.balance, 0.0);
        assert_eq!(account.credit_limit, Some(18000.0));
        assert!(account.opened_on.is_none());
        assert!(account.payment_history.is_empty());
        assert!(account.on_time_percentage.is_none());
    }

    #[test]
    fn canonical_accounts_keep_flattened_order() {
        let report = json!({
            "providerViews": [{
                "providerCode": "EXP",
                "installmentAccounts": [{ "creditorName": "Auto Loan", "balance": 9000 }],
                "revolvingAccounts": [{ "creditorName": "Card", "balance": 300 }]
            }]
        });

        let accounts = canonical_accounts(Some(&report), BureauSelector::All);
        let kinds: Vec<AccountKind> = accounts.iter().map(|account| account.kind).collect();
        assert_eq!(kinds, vec![AccountKind::Revolving, AccountKind::Installment]);
        assert_eq!(accounts[1].creditor_name.as_deref(), Some("Auto Loan"));
    }
}
