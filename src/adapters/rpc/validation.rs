//! Request validation for the RPC facade.

use thiserror::Error;

use super::status::RpcStatus;

/// History page size when the caller gives none.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Largest history page a caller may request.
pub const MAX_HISTORY_LIMIT: u32 = 1000;

/// Caller-supplied input that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("market is required")]
    EmptyMarket,
    #[error("limit must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: u32, max: u32 },
}

impl From<ValidationError> for RpcStatus {
    fn from(err: ValidationError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

/// Reject blank market codes; anything else is passed through untouched.
pub fn require_market(market: &str) -> Result<&str, ValidationError> {
    if market.trim().is_empty() {
        return Err(ValidationError::EmptyMarket);
    }
    Ok(market)
}

/// Resolve the `(limit, offset)` window of a history request.
pub fn history_window(
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<(u32, u32), ValidationError> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(ValidationError::LimitOutOfRange {
            got: limit,
            max: MAX_HISTORY_LIMIT,
        });
    }
    Ok((limit, offset.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_market_rejected() {
        assert_eq!(require_market(""), Err(ValidationError::EmptyMarket));
        assert_eq!(require_market("  "), Err(ValidationError::EmptyMarket));
        assert_eq!(require_market("usdtrub"), Ok("usdtrub"));
    }

    #[test]
    fn test_history_window_defaults() {
        assert_eq!(history_window(None, None), Ok((DEFAULT_HISTORY_LIMIT, 0)));
        assert_eq!(history_window(Some(10), Some(20)), Ok((10, 20)));
    }

    #[test]
    fn test_history_window_bounds() {
        assert!(history_window(Some(0), None).is_err());
        assert!(history_window(Some(MAX_HISTORY_LIMIT), None).is_ok());
        assert_eq!(
            history_window(Some(MAX_HISTORY_LIMIT + 1), None),
            Err(ValidationError::LimitOutOfRange {
                got: MAX_HISTORY_LIMIT + 1,
                max: MAX_HISTORY_LIMIT
            })
        );
    }
}
