//! Multi-bureau credit report reconciliation.
//!
//! Raw bureau payloads stay as `serde_json::Value`; every derivation here is a
//! pure function of the payload, a [`BureauSelector`], and (for metrics) an
//! as-of date.

pub mod account;
pub mod bureau;
pub mod flatten;
pub mod identity;
pub mod metrics;
mod payload;
pub mod score;
pub mod snapshot;

pub use account::{canonical_accounts, AccountKind, CanonicalAccount, PaymentStatus};
pub use bureau::{filter_provider_views, Bureau, BureauSelector};
pub use flatten::{
    flatten, flatten_accounts, flatten_collections, flatten_inquiries, flatten_public_records,
    flatten_tagged_accounts, CollectionKind,
};
pub use identity::{reconcile_identity, IdentitySource, ReconciledIdentity};
pub use metrics::{derive_metrics, DerivedMetrics, MetricSource, MetricsProvenance};
pub use score::{categorize, ScoreBand};
pub use snapshot::{bureau_scores, bureau_summary, BureauScore, CreditFile, CreditSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown bureau selector '{selector}' (expected equifax, transunion, experian, or all)")]
    InvalidBureau { selector: String },
    #[error("failed to read credit report: {0}")]
    Io(#[from] std::io::Error),
    #[error("credit report is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
