use serde::Deserialize;
use utoipa::ToSchema;

/// Default page size for listing and search.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Hard cap on page size.
pub const MAX_PAGE_SIZE: usize = 1000;
/// Guard against pathological search strings.
pub const MAX_QUERY_LEN: usize = 1024;

/// Query parameters for the search endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(default)]
pub struct SearchParams {
    /// Case-insensitive substring match against original name and
    /// description.
    pub q: Option<String>,

    /// Exact (case-insensitive) tag filter.
    pub tag: Option<String>,

    /// Sort order: "upload_time" (default), "size", or "downloads".
    /// All orders are descending.
    pub sort: Option<String>,

    /// Maximum number of results to return (default: 50, max: 1000, min: 1)
    #[param(minimum = 1, maximum = 1000, example = 50)]
    pub limit: Option<usize>,

    /// Offset for pagination (default: 0)
    #[param(minimum = 0, example = 0)]
    pub offset: Option<usize>,
}

impl SearchParams {
    /// Validate search query parameters
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err("Limit must be at least 1".to_string());
            }
            if limit > MAX_PAGE_SIZE {
                return Err(format!("Limit cannot exceed {}", MAX_PAGE_SIZE));
            }
        }

        if let Some(ref q) = self.q {
            if q.len() > MAX_QUERY_LEN {
                return Err(format!(
                    "Query parameter 'q' must not exceed {} characters",
                    MAX_QUERY_LEN
                ));
            }
        }

        // sort is validated by the handler via SortKey::from_str

        Ok(())
    }
}

/// Query parameters for the listing endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(default)]
pub struct ListParams {
    /// Maximum number of results to return (default: 50, max: 1000, min: 1)
    #[param(minimum = 1, maximum = 1000, example = 50)]
    pub limit: Option<usize>,

    /// Offset for pagination (default: 0)
    #[param(minimum = 0, example = 0)]
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err("Limit must be at least 1".to_string());
            }
            if limit > MAX_PAGE_SIZE {
                return Err(format!("Limit cannot exceed {}", MAX_PAGE_SIZE));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_default_is_valid() {
        assert!(SearchParams::default().validate().is_ok());
    }

    #[test]
    fn test_search_params_rejects_out_of_range_limit() {
        let params = SearchParams {
            limit: Some(0),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SearchParams {
            limit: Some(MAX_PAGE_SIZE + 1),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SearchParams {
            limit: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_search_params_rejects_oversized_query() {
        let params = SearchParams {
            q: Some("x".repeat(MAX_QUERY_LEN + 1)),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
