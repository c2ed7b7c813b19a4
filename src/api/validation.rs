use super::ApiError;
use crate::constants::limits::MIN_TOP_K;

pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    let Some(query) = query else {
        return Err(ApiError::validation("Missing required parameter: query"));
    };
    if query.trim().is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(query)
}

pub fn validate_user_id(user_id: Option<&str>) -> Result<&str, ApiError> {
    let Some(user_id) = user_id else {
        return Err(ApiError::validation("Missing required parameter: user_id"));
    };
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("user_id cannot be empty"));
    }
    if trimmed.len() > 255 {
        return Err(ApiError::validation(
            "user_id must be 255 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_top_k(top_k: Option<i64>, default: u64, max: u64) -> Result<u64, ApiError> {
    let Some(top_k) = top_k else {
        return Ok(default);
    };

    match u64::try_from(top_k) {
        Ok(k) if (MIN_TOP_K..=max).contains(&k) => Ok(k),
        _ => Err(ApiError::validation(format!(
            "Invalid top_k: {}. top_k must be between {} and {}",
            top_k, MIN_TOP_K, max
        ))),
    }
}

pub fn validate_threshold(threshold: Option<f64>, default: f64) -> Result<f64, ApiError> {
    match threshold {
        None => Ok(default),
        Some(t) if t.is_finite() => Ok(t),
        Some(t) => Err(ApiError::validation(format!(
            "Invalid threshold: {t}. threshold must be a finite number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(Some("ai")).unwrap(), "ai");
        // Cache keys are exact, so surrounding spaces are kept.
        assert_eq!(validate_search_query(Some(" ai ")).unwrap(), " ai ");
        assert!(validate_search_query(Some("   ")).is_err());
        assert!(validate_search_query(Some("")).is_err());
        assert!(validate_search_query(None).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert_eq!(validate_user_id(Some(" u1 ")).unwrap(), "u1");
        assert!(validate_user_id(Some("")).is_err());
        assert!(validate_user_id(None).is_err());
        assert!(validate_user_id(Some("x".repeat(256).as_str())).is_err());
    }

    #[test]
    fn test_validate_top_k() {
        assert_eq!(validate_top_k(None, 5, 100).unwrap(), 5);
        assert_eq!(validate_top_k(Some(1), 5, 100).unwrap(), 1);
        assert_eq!(validate_top_k(Some(100), 5, 100).unwrap(), 100);
        assert!(validate_top_k(Some(0), 5, 100).is_err());
        assert!(validate_top_k(Some(-3), 5, 100).is_err());
        assert!(validate_top_k(Some(101), 5, 100).is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!((validate_threshold(None, 0.5).unwrap() - 0.5).abs() < f64::EPSILON);
        assert!((validate_threshold(Some(-1.0), 0.5).unwrap() + 1.0).abs() < f64::EPSILON);
        assert!(validate_threshold(Some(f64::NAN), 0.5).is_err());
        assert!(validate_threshold(Some(f64::INFINITY), 0.5).is_err());
    }
}
