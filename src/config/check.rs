use serde_json::Value;
use url::Url;

use crate::error::ConfigErrors;

use super::ReporterArgs;

/// Type-check reporter arguments, recording one message per problem.
#[must_use]
pub fn check_reporter_args(args: &ReporterArgs) -> ConfigErrors {
    let mut errors = ConfigErrors::new();

    match &args.endpoint {
        Value::String(endpoint) => {
            if let Err(err) = Url::parse(endpoint) {
                errors.add_error(format!("endpoint must be a valid URL: {err}"));
            }
        }
        _ => errors.add_error("endpoint must be a string"),
    }

    if !is_string_or_none(&args.username) {
        errors.add_error("username must be a string or None");
    }

    match &args.channels {
        Value::Null => {}
        Value::Array(items) => {
            if !items.iter().all(Value::is_string) {
                errors.add_error("channels must contain only strings");
            }
        }
        _ => errors.add_error("channels must be a list or None"),
    }

    if !is_string_or_none(&args.icon_url) {
        errors.add_error("icon_url must be a string or None");
    }

    if !is_bool_or_none(&args.debug) {
        errors.add_error("debug must be a boolean");
    }
    if !is_bool_or_none(&args.verify) {
        errors.add_error("verify must be a boolean");
    }

    errors
}

const fn is_string_or_none(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Null)
}

const fn is_bool_or_none(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Null)
}
