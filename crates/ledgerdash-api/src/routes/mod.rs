//! Route modules

pub mod dashboard;
pub mod login;
pub mod reports;

use chrono::Local;
use ledgerdash_config::TimeRange;
use ledgerdash_core::DateRange;
use std::collections::HashMap;

use crate::AppState;

/// Read a request field, treating a missing key as empty
pub(crate) fn field<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or("")
}

/// Date range for a request.
///
/// Precedence: a `range` preset (`month`, `quarter`, `year`, `all`), then
/// explicit `from`/`to`, then the configured default range.
pub(crate) fn requested_range(state: &AppState, params: &HashMap<String, String>) -> DateRange {
    if let Ok(preset) = field(params, "range").parse::<TimeRange>() {
        return preset_range(preset);
    }
    let (from, to) = (field(params, "from"), field(params, "to"));
    if from.trim().is_empty() && to.trim().is_empty() {
        preset_range(state.config.dashboard.default_range)
    } else {
        DateRange::from_query(from, to)
    }
}

pub(crate) fn preset_range(preset: TimeRange) -> DateRange {
    DateRange::preset(preset, Local::now().date_naive())
}

/// Query string that reproduces `range` on the next request
pub(crate) fn range_query(state: &AppState, range: &DateRange) -> Vec<(&'static str, String)> {
    if range.is_all_time() {
        if state.config.dashboard.default_range == TimeRange::All {
            Vec::new()
        } else {
            vec![("range", TimeRange::All.to_string())]
        }
    } else {
        vec![("from", range.from_param()), ("to", range.to_param())]
    }
}

/// Join key/value pairs into `path?k=v&...`, encoding values
pub(crate) fn url_with_query(path: &str, pairs: &[(&str, String)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_query_skips_empty_values() {
        let url = url_with_query(
            "/dashboard",
            &[("from", "2024-01-01".to_string()), ("to", String::new()), ("msg", "deleted".to_string())],
        );
        assert_eq!(url, "/dashboard?from=2024-01-01&msg=deleted");
        assert_eq!(url_with_query("/dashboard", &[]), "/dashboard");
    }

    #[tokio::test]
    async fn test_requested_range_precedence() {
        let state = crate::test_support::state().await;
        let mut params = HashMap::new();
        assert!(requested_range(&state, &params).is_all_time());

        params.insert("from".to_string(), "2024-02-01".to_string());
        params.insert("to".to_string(), "2024-01-01".to_string());
        let range = requested_range(&state, &params);
        assert_eq!(range.from_param(), "2024-01-01");
        assert_eq!(range.to_param(), "2024-02-01");

        params.insert("range".to_string(), "all".to_string());
        assert!(requested_range(&state, &params).is_all_time());
    }
}
