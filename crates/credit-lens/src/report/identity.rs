use super::bureau::{selected_views, BureauSelector};
use super::payload;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const DATE_OF_BIRTH: &str = "dateOfBirth";
const PREVIOUS_ADDRESSES: &str = "previousAddresses";
const CURRENT_ADDRESS: &str = "currentAddress";
const NAME: &str = "name";
const EMPLOYMENT: &str = "employment";

/// Where a reconciled identity was assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentitySource {
    /// Seeded from the subject of the first provider view that carried one.
    ProviderView { provider_code: Option<String> },
    /// Taken verbatim from the report's top-level `personalInfo`.
    LegacyPersonalInfo,
}

/// Subject record merged across the filtered provider views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledIdentity {
    pub source: IdentitySource,
    pub record: Map<String, Value>,
}

impl ReconciledIdentity {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.record.get(key).filter(|value| !value.is_null())
    }

    /// Full name; bureaus send either a string or `{ first, middle, last }`.
    pub fn name(&self) -> Option<String> {
        match self.field(NAME)? {
            Value::String(name) => Some(name.trim().to_string()).filter(|name| !name.is_empty()),
            name @ Value::Object(_) => {
                let parts: Vec<&str> = ["first", "middle", "last"]
                    .into_iter()
                    .filter_map(|part| payload::str_at(name, &[part]))
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            _ => None,
        }
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.field(DATE_OF_BIRTH)
            .and_then(Value::as_str)
            .and_then(payload::parse_date)
    }

    pub fn current_address(&self) -> Option<&Value> {
        self.field(CURRENT_ADDRESS)
    }

    pub fn previous_addresses(&self) -> &[Value] {
        self.field(PREVIOUS_ADDRESSES)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Employment history of the seed bureau only; never merged across bureaus.
    pub fn employment(&self) -> &[Value] {
        self.field(EMPLOYMENT)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn has(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    fn fill_from(&mut self, subject: &Map<String, Value>) {
        if !self.has(DATE_OF_BIRTH) {
            if let Some(dob) = subject.get(DATE_OF_BIRTH).filter(|value| !value.is_null()) {
                self.record.insert(DATE_OF_BIRTH.to_string(), dob.clone());
            }
        }

        let previous_missing = match self.field(PREVIOUS_ADDRESSES) {
            None => true,
            Some(Value::Array(addresses)) => addresses.is_empty(),
            Some(_) => false,
        };
        if previous_missing {
            if let Some(addresses) = subject
                .get(PREVIOUS_ADDRESSES)
                .and_then(Value::as_array)
                .filter(|addresses| !addresses.is_empty())
            {
                self.record.insert(
                    PREVIOUS_ADDRESSES.to_string(),
                    Value::Array(addresses.clone()),
                );
            }
        }

        if !self.has(CURRENT_ADDRESS) {
            if let Some(address) = subject.get(CURRENT_ADDRESS).filter(|value| !value.is_null()) {
                self.record.insert(CURRENT_ADDRESS.to_string(), address.clone());
            }
        }
    }
}

/// Merges subject data across the views admitted by `selector`.
///
/// The first view with a subject seeds the result. Later views only fill a
/// missing date of birth, previous-address list, or current address; every
/// other field, employment included, stays with the seed bureau. Without any
/// subject the report's legacy `personalInfo` object is returned as-is.
pub fn reconcile_identity(
    report: Option<&Value>,
    selector: BureauSelector,
) -> Option<ReconciledIdentity> {
    let mut subjects = selected_views(report, selector)
        .into_iter()
        .filter_map(|view| payload::subject(view).map(|subject| (view, subject)));

    let Some((seed_view, seed)) = subjects.next() else {
        return legacy_personal_info(report);
    };

    let mut identity = ReconciledIdentity {
        source: IdentitySource::ProviderView {
            provider_code: payload::provider_code(seed_view).map(str::to_string),
        },
        record: seed.clone(),
    };

    for (view, subject) in subjects {
        debug!(
            provider = payload::provider_code(view).unwrap_or("unknown"),
            "filling identity gaps from later bureau"
        );
        identity.fill_from(subject);
    }

    Some(identity)
}

fn legacy_personal_info(report: Option<&Value>) -> Option<ReconciledIdentity> {
    let info = payload::value_at(report?, &[payload::PERSONAL_INFO])?;
    match info.as_object() {
        Some(record) => Some(ReconciledIdentity {
            source: IdentitySource::LegacyPersonalInfo,
            record: record.clone(),
        }),
        None => {
            warn!("ignoring legacy personalInfo that is not an object");
            None
        }
    }
}
