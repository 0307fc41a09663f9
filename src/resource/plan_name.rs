//! Plan name normalization
//!
//! Add-on plans are named `service[:qualifier]`, e.g. `heroku-postgresql` or
//! `heroku-postgresql:hobby-dev`. Heroku always reports the qualified name, even
//! when the plan was requested without a qualifier.

/// Separator between a service name and its plan qualifier
pub const QUALIFIER_SEPARATOR: char = ':';

/// Whether a plan name carries a qualifier
pub fn is_qualified(plan: &str) -> bool {
    plan.contains(QUALIFIER_SEPARATOR)
}

/// Strip the qualifier from a plan name, if any
pub fn service_name(plan: &str) -> &str {
    plan.split_once(QUALIFIER_SEPARATOR)
        .map(|(service, _)| service)
        .unwrap_or(plan)
}

/// Plan name to record given what was declared and what the server reports
///
/// Pre: `reported` is the server's plan name, `declared` the previously
/// declared plan (possibly empty).
/// Post: the reported name, with its qualifier stripped only when `declared`
/// is non-empty and unqualified. An empty or qualified declaration yields
/// `reported` unchanged.
pub fn normalize_plan(declared: &str, reported: &str) -> String {
    if declared.is_empty() || is_qualified(declared) {
        return reported.to_string();
    }
    service_name(reported).to_string()
}
