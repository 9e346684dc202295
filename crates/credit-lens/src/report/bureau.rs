use super::payload;
use super::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Credit reporting agencies whose submissions appear as provider views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bureau {
    Equifax,
    TransUnion,
    Experian,
}

impl Bureau {
    pub const fn ordered() -> [Self; 3] {
        [Self::Equifax, Self::TransUnion, Self::Experian]
    }

    /// Code used for this bureau in the `providerCode` field of a provider view.
    pub const fn provider_code(self) -> &'static str {
        match self {
            Self::Equifax => "EFX",
            Self::TransUnion => "TU",
            Self::Experian => "EXP",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Equifax => "Equifax",
            Self::TransUnion => "TransUnion",
            Self::Experian => "Experian",
        }
    }

    pub fn from_provider_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|bureau| bureau.provider_code().eq_ignore_ascii_case(code.trim()))
    }

    fn matches(self, view: &Value) -> bool {
        payload::provider_code(view)
            .map(|code| code.eq_ignore_ascii_case(self.provider_code()))
            .unwrap_or(false)
    }
}

/// Either one bureau or every bureau present in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BureauSelector {
    #[default]
    All,
    Bureau(Bureau),
}

impl BureauSelector {
    /// Parses an optional selector; absent or blank input selects every bureau.
    pub fn parse(raw: Option<&str>) -> Result<Self, ReportError> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(Self::All),
            Some(value) => value.parse(),
        }
    }

    pub const fn bureau(self) -> Option<Bureau> {
        match self {
            Self::All => None,
            Self::Bureau(bureau) => Some(bureau),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All bureaus",
            Self::Bureau(bureau) => bureau.label(),
        }
    }

    /// Narrows `views` to the ones this selector admits, preserving order.
    pub fn filter<'a>(&self, views: &'a [Value]) -> Vec<&'a Value> {
        match self {
            Self::All => views.iter().collect(),
            Self::Bureau(bureau) => views.iter().filter(|view| bureau.matches(view)).collect(),
        }
    }
}

impl FromStr for BureauSelector {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let selector = match normalized.as_str() {
            "all" => Self::All,
            "equifax" | "efx" => Self::Bureau(Bureau::Equifax),
            "transunion" | "trans_union" | "tu" => Self::Bureau(Bureau::TransUnion),
            "experian" | "exp" => Self::Bureau(Bureau::Experian),
            _ => {
                return Err(ReportError::InvalidBureau {
                    selector: value.to_string(),
                })
            }
        };

        Ok(selector)
    }
}

impl fmt::Display for BureauSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Bureau(Bureau::Equifax) => f.write_str("equifax"),
            Self::Bureau(Bureau::TransUnion) => f.write_str("transunion"),
            Self::Bureau(Bureau::Experian) => f.write_str("experian"),
        }
    }
}

impl TryFrom<String> for BureauSelector {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BureauSelector> for String {
    fn from(selector: BureauSelector) -> Self {
        selector.to_string()
    }
}

/// String-level filter: rejects unknown selectors instead of returning data.
pub fn filter_provider_views<'a>(
    views: &'a [Value],
    selector: Option<&str>,
) -> Result<Vec<&'a Value>, ReportError> {
    let selector = BureauSelector::parse(selector)?;
    Ok(selector.filter(views))
}

/// Filtered provider views of `report`; malformed reports yield no views.
pub(crate) fn selected_views(report: Option<&Value>, selector: BureauSelector) -> Vec<&Value> {
    report
        .and_then(payload::provider_views)
        .map(|views| selector.filter(views))
        .unwrap_or_default()
}
