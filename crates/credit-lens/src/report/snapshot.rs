use super::account::{canonical_accounts, CanonicalAccount};
use super::bureau::{selected_views, Bureau, BureauSelector};
use super::flatten::{flatten_collections, flatten_inquiries, flatten_public_records};
use super::identity::{reconcile_identity, ReconciledIdentity};
use super::metrics::{derive_metrics, DerivedMetrics};
use super::payload;
use super::score::{categorize, ScoreBand};
use super::ReportError;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A multi-bureau credit file as delivered by the upstream integration.
#[derive(Debug, Clone)]
pub struct CreditFile {
    payload: Value,
}

impl CreditFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Only JSON syntax errors fail here; missing or mistyped fields are
    /// tolerated by every derivation.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReportError> {
        let payload = serde_json::from_reader(reader)?;
        Ok(Self { payload })
    }

    pub fn from_value(payload: Value) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Bureaus with at least one provider view, in first-seen order.
    pub fn bureaus(&self) -> Vec<Bureau> {
        let mut bureaus = Vec::new();
        let codes = selected_views(Some(&self.payload), BureauSelector::All)
            .into_iter()
            .filter_map(payload::provider_code);
        for bureau in codes.filter_map(Bureau::from_provider_code) {
            if !bureaus.contains(&bureau) {
                bureaus.push(bureau);
            }
        }
        bureaus
    }

    pub fn snapshot(&self, selector: BureauSelector, as_of: NaiveDate) -> CreditSnapshot {
        CreditSnapshot::build(Some(&self.payload), selector, as_of)
    }
}

/// Score reported by one provider view, with its band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BureauScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bureau: Option<Bureau>,
    pub score: i64,
    pub band: ScoreBand,
    pub band_label: &'static str,
}

/// Every derived view of a credit file for one bureau selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditSnapshot {
    pub selector: BureauSelector,
    pub as_of: NaiveDate,
    pub accounts: Vec<CanonicalAccount>,
    pub inquiries: Vec<Value>,
    pub public_records: Vec<Value>,
    pub collections: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ReconciledIdentity>,
    pub metrics: DerivedMetrics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<BureauScore>,
}

impl CreditSnapshot {
    pub fn build(report: Option<&Value>, selector: BureauSelector, as_of: NaiveDate) -> Self {
        let accounts = canonical_accounts(report, selector);
        let metrics = derive_metrics(&accounts, bureau_summary(report, selector), as_of);

        let snapshot = Self {
            selector,
            as_of,
            inquiries: flatten_inquiries(report, selector).into_iter().cloned().collect(),
            public_records: flatten_public_records(report, selector)
                .into_iter()
                .cloned()
                .collect(),
            collections: flatten_collections(report, selector)
                .into_iter()
                .cloned()
                .collect(),
            identity: reconcile_identity(report, selector),
            scores: bureau_scores(report, selector),
            accounts,
            metrics,
        };

        debug!(
            %selector,
            accounts = snapshot.accounts.len(),
            inquiries = snapshot.inquiries.len(),
            public_records = snapshot.public_records.len(),
            collections = snapshot.collections.len(),
            "built credit snapshot"
        );
        snapshot
    }
}

/// Summary fed to metric derivation.
///
/// A single bureau contributes the summary of its first view that carries
/// one. Bureau aggregates are never combined across bureaus, so selecting
/// every bureau recomputes metrics from the accounts alone.
pub fn bureau_summary(report: Option<&Value>, selector: BureauSelector) -> Option<&Value> {
    match selector {
        BureauSelector::All => None,
        BureauSelector::Bureau(_) => selected_views(report, selector)
            .into_iter()
            .find_map(payload::summary),
    }
}

pub fn bureau_scores(report: Option<&Value>, selector: BureauSelector) -> Vec<BureauScore> {
    selected_views(report, selector)
        .into_iter()
        .filter_map(|view| {
            let score = payload::number_at(view, &[payload::CREDIT_SCORE])?.round() as i64;
            let provider_code = payload::provider_code(view);
            let band = categorize(score);
            Some(BureauScore {
                provider_code: provider_code.map(str::to_string),
                bureau: provider_code.and_then(Bureau::from_provider_code),
                score,
                band,
                band_label: band.label(),
            })
        })
        .collect()
}
