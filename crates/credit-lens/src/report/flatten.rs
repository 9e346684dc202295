use super::account::AccountKind;
use super::bureau::{selected_views, BureauSelector};
use super::payload;
use serde_json::Value;
use tracing::warn;

/// Kinds of bureau sub-collections that flatten into one ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Accounts,
    Inquiries,
    PublicRecords,
    Collections,
}

impl CollectionKind {
    /// Sub-collection fields read from each provider view, in concatenation order.
    ///
    /// Collections are kept out of public records so they are never counted twice.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Accounts => &["revolvingAccounts", "installmentAccounts", "mortgageAccounts"],
            Self::Inquiries => &["inquiries"],
            Self::PublicRecords => &["publicRecords", "bankruptcies", "liens", "judgments"],
            Self::Collections => &["collections"],
        }
    }
}

/// Concatenates the `kind` sub-collections of every view admitted by `selector`.
///
/// Views are walked in filtered order; within a view the fields of
/// [`CollectionKind::fields`] are walked in order. A missing report, missing
/// provider views, or a sub-collection that is not an array contributes nothing.
pub fn flatten(
    report: Option<&Value>,
    selector: BureauSelector,
    kind: CollectionKind,
) -> Vec<&Value> {
    let mut items = Vec::new();
    for view in selected_views(report, selector) {
        for field in kind.fields() {
            items.extend(sub_collection(view, field));
        }
    }
    items
}

pub fn flatten_accounts(report: Option<&Value>, selector: BureauSelector) -> Vec<&Value> {
    flatten(report, selector, CollectionKind::Accounts)
}

pub fn flatten_inquiries(report: Option<&Value>, selector: BureauSelector) -> Vec<&Value> {
    flatten(report, selector, CollectionKind::Inquiries)
}

pub fn flatten_public_records(report: Option<&Value>, selector: BureauSelector) -> Vec<&Value> {
    flatten(report, selector, CollectionKind::PublicRecords)
}

pub fn flatten_collections(report: Option<&Value>, selector: BureauSelector) -> Vec<&Value> {
    flatten(report, selector, CollectionKind::Collections)
}

/// Same order as [`flatten_accounts`], with each raw account tagged by the
/// collection it came from.
pub fn flatten_tagged_accounts(
    report: Option<&Value>,
    selector: BureauSelector,
) -> Vec<(AccountKind, &Value)> {
    let fields = CollectionKind::Accounts.fields();
    let mut items = Vec::new();
    for view in selected_views(report, selector) {
        for (field, kind) in fields.iter().zip(AccountKind::ordered()) {
            items.extend(sub_collection(view, field).map(|raw| (kind, raw)));
        }
    }
    items
}

fn sub_collection<'a>(view: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    let items: &[Value] = match payload::value_at(view, &[field]) {
        Some(Value::Array(array)) => array,
        Some(_) => {
            warn!(
                provider = payload::provider_code(view).unwrap_or("unknown"),
                field,
                "ignoring bureau sub-collection that is not an array"
            );
            &[]
        }
        None => &[],
    };
    items.iter()
}
