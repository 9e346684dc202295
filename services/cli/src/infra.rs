use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use credit_lens::config::AppConfig;
use credit_lens::report::{BureauSelector, ReportError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The `--bureau` flag when given, otherwise the configured default.
pub(crate) fn resolve_selector(
    raw: Option<&str>,
    config: &AppConfig,
) -> Result<BureauSelector, ReportError> {
    match raw {
        Some(raw) => BureauSelector::parse(Some(raw)),
        None => Ok(config.report.default_bureau),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_lens::config::{AppEnvironment, ReportConfig, TelemetryConfig};
    use credit_lens::report::Bureau;

    fn config(default_bureau: BureauSelector) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            report: ReportConfig { default_bureau },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-10-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date"))
        );
        let error = parse_date("Oct 1").expect_err("rejected");
        assert!(error.contains("'Oct 1'"));
    }

    #[test]
    fn flag_overrides_configured_bureau() {
        let config = config(BureauSelector::Bureau(Bureau::Experian));
        assert_eq!(
            resolve_selector(None, &config).expect("default"),
            BureauSelector::Bureau(Bureau::Experian)
        );
        assert_eq!(
            resolve_selector(Some("all"), &config).expect("flag"),
            BureauSelector::All
        );
        assert!(matches!(
            resolve_selector(Some("innovis"), &config),
            Err(ReportError::InvalidBureau { .. })
        ));
    }
}
