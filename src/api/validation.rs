use crate::api::errors::ApiError;

/// Evaluate field rules in declaration order and fail on the first violated
/// one, so the 422 message is deterministic regardless of how many rules a
/// payload breaks.
pub(crate) fn check(rules: &[(bool, &'static str)]) -> Result<(), ApiError> {
    for (ok, message) in rules {
        if !ok {
            return Err(ApiError::Validation((*message).to_string()));
        }
    }
    Ok(())
}

pub(crate) fn min_len(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

pub(crate) fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// First reported message out of a `validator` derive run, for payloads
/// where rule order is immaterial (auth bodies).
pub(crate) fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .filter_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid request payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failing_rule_wins() {
        let result = check(&[
            (true, "first"),
            (false, "second"),
            (false, "third"),
        ]);
        match result {
            Err(ApiError::Validation(message)) => assert_eq!(message, "second"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn all_rules_passing_is_ok() {
        assert!(check(&[(true, "a"), (true, "b")]).is_ok());
    }

    #[test]
    fn min_len_trims_before_counting() {
        assert!(min_len("  abc  ", 3));
        assert!(!min_len("  ab  ", 3));
        assert!(!min_len("   ", 1));
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("x"));
        assert!(!not_blank(""));
        assert!(!not_blank("   "));
    }
}
