use crate::error::{validation_error, AppError};

pub const NO_URL_MESSAGE: &str = "No URL provided";

/// Ensures the URL carries an `http://` or `https://` scheme.
///
/// Nothing else is validated; malformed URLs are passed through and the
/// lexical extractor copes with whatever it is given.
pub fn normalize_url(raw: Option<&str>) -> Result<String, AppError> {
    let url = match raw {
        Some(url) if !url.is_empty() => url,
        _ => return Err(validation_error(NO_URL_MESSAGE)),
    };

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Ok(format!("http://{url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(matches!(normalize_url(None), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_url(Some("")), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_scheme_is_prepended() {
        assert_eq!(normalize_url(Some("example.com")).unwrap(), "http://example.com");
        assert_eq!(
            normalize_url(Some("ftp://example.com")).unwrap(),
            "http://ftp://example.com"
        );
    }

    #[test]
    fn test_existing_scheme_is_kept() {
        assert_eq!(normalize_url(Some("http://example.com")).unwrap(), "http://example.com");
        assert_eq!(
            normalize_url(Some("https://example.com/a?b=c")).unwrap(),
            "https://example.com/a?b=c"
        );
    }

    #[test]
    fn test_malformed_input_is_tolerated() {
        assert_eq!(normalize_url(Some("::::")).unwrap(), "http://::::");
    }
}
