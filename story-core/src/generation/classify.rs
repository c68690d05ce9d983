//! Failure classification and backoff delays.

use std::time::Duration;

/// How a failed attempt is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Bad or missing credentials. Never retried.
    Authentication,
    /// Quota or rate limit. Retried with a growing delay.
    RateLimited,
    /// Anything else. Retried after a short fixed delay.
    Transient,
}

impl FailureClass {
    /// Classify a client error by its message, then by HTTP status.
    ///
    /// Client setup errors, such as a key that cannot be sent as a header,
    /// count as authentication failures.
    pub fn of(error: &gemini::Error) -> Self {
        if matches!(error, gemini::Error::NoApiKey | gemini::Error::Config(_)) {
            return FailureClass::Authentication;
        }

        match Self::from_message(&error.to_string()) {
            FailureClass::Transient => match error.status() {
                Some(401 | 403) => FailureClass::Authentication,
                Some(429) => FailureClass::RateLimited,
                _ => FailureClass::Transient,
            },
            class => class,
        }
    }

    /// Classify an error message. Authentication wins over rate limiting.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if message.contains("API key not valid") || lower.contains("authentication") {
            FailureClass::Authentication
        } else if lower.contains("quota") || lower.contains("rate limit") {
            FailureClass::RateLimited
        } else {
            FailureClass::Transient
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FailureClass::Authentication)
    }
}

/// Delays applied between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Rate-limit delay grows by this much per attempt (5s, 10s, 15s, ...).
    pub rate_limit_step: Duration,
    /// Delay after any other retryable failure.
    pub transient_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            rate_limit_step: Duration::from_secs(5),
            transient_delay: Duration::from_secs(2),
        }
    }
}

impl BackoffPolicy {
    /// Delay after the zero-based `attempt` failed, or `None` for a terminal failure.
    pub fn delay(&self, class: FailureClass, attempt: u32) -> Option<Duration> {
        match class {
            FailureClass::Authentication => None,
            FailureClass::RateLimited => Some(self.rate_limit_step * (attempt + 1)),
            FailureClass::Transient => Some(self.transient_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> gemini::Error {
        gemini::Error::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_invalid_key_message() {
        let err = api(
            400,
            "INVALID_ARGUMENT: API key not valid. Please pass a valid API key.",
        );
        assert_eq!(FailureClass::of(&err), FailureClass::Authentication);
    }

    #[test]
    fn test_authentication_is_case_insensitive() {
        assert_eq!(
            FailureClass::from_message("Request had invalid Authentication credentials"),
            FailureClass::Authentication
        );
    }

    #[test]
    fn test_quota_and_rate_limit_messages() {
        assert_eq!(
            FailureClass::from_message("RESOURCE_EXHAUSTED: You exceeded your current Quota"),
            FailureClass::RateLimited
        );
        assert_eq!(
            FailureClass::from_message("Rate Limit reached"),
            FailureClass::RateLimited
        );
    }

    #[test]
    fn test_authentication_wins_over_quota() {
        assert_eq!(
            FailureClass::from_message("authentication quota exceeded"),
            FailureClass::Authentication
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FailureClass::of(&api(403, "PERMISSION_DENIED")), FailureClass::Authentication);
        assert_eq!(FailureClass::of(&api(429, "RESOURCE_EXHAUSTED")), FailureClass::RateLimited);
        assert_eq!(FailureClass::of(&api(503, "UNAVAILABLE")), FailureClass::Transient);
        assert_eq!(
            FailureClass::of(&gemini::Error::Network("connection reset".to_string())),
            FailureClass::Transient
        );
        assert_eq!(FailureClass::of(&gemini::Error::NoApiKey), FailureClass::Authentication);
    }

    #[test]
    fn test_unsendable_key_is_authentication() {
        let err = gemini::Error::Config("Invalid API key: failed to parse header value".to_string());
        assert_eq!(FailureClass::of(&err), FailureClass::Authentication);
        assert!(FailureClass::of(&err).is_terminal());
    }

    #[test]
    fn test_backoff_delays() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(FailureClass::Authentication, 0), None);
        assert_eq!(
            policy.delay(FailureClass::RateLimited, 0),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            policy.delay(FailureClass::RateLimited, 2),
            Some(Duration::from_secs(15))
        );
        assert_eq!(
            policy.delay(FailureClass::Transient, 2),
            Some(Duration::from_secs(2))
        );
        assert!(FailureClass::Authentication.is_terminal());
        assert!(!FailureClass::RateLimited.is_terminal());
    }
}
