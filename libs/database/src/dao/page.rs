use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{DaoError, DaoResult, FieldErrors};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

/// `?page=&size=` query parameters as sent by the client, not yet checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// 1-based page number, defaults to 1
    pub page: Option<i64>,
    /// Items per page, defaults to the configured page size
    pub size: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// Checks the request against `bounds`, collecting every offending parameter.
    pub fn validate(&self, bounds: &PageBounds) -> DaoResult<Page> {
        let mut errors = FieldErrors::new();

        let page = self.page.unwrap_or(1);
        if page < 1 {
            errors.add("page", "must be at least 1");
        }

        let size = self.size.unwrap_or(bounds.default_size as i64);
        if size < 1 || size as u64 > bounds.max_size {
            errors.add(
                "size",
                format!("must be between 1 and {}", bounds.max_size),
            );
        }

        // The offset is bound as a signed 64-bit value.
        if page > 1 && size >= 1 && (page - 1).checked_mul(size).is_none() {
            errors.add("page", "is too large for the requested size");
        }

        if errors.is_empty() {
            Ok(Page {
                page: page as u64,
                size: size as u64,
            })
        } else {
            Err(DaoError::Validation(errors))
        }
    }
}

/// Server-side page size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageBounds {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

#[cfg(feature = "config")]
impl FromEnv for PageBounds {
    /// `PAGE_SIZE_DEFAULT` (20) and `PAGE_SIZE_MAX` (100)
    fn from_env() -> Result<Self, ConfigError> {
        let default_size: u64 = env_parse("PAGE_SIZE_DEFAULT", "20")?;
        let max_size: u64 = env_parse("PAGE_SIZE_MAX", "100")?;

        if default_size == 0 || default_size > max_size {
            return Err(ConfigError::ParseError {
                key: "PAGE_SIZE_DEFAULT".to_string(),
                details: format!("must be between 1 and PAGE_SIZE_MAX ({max_size})"),
            });
        }

        Ok(Self {
            default_size,
            max_size,
        })
    }
}

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub size: u64,
}

impl Page {
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }
}

/// One page of results plus the navigation envelope
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PageResult<T> {
    pub results: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub size: u64,
    /// Next page number, absent on the last page
    pub next: Option<u64>,
    /// Previous page number, absent on the first page
    pub previous: Option<u64>,
}

impl<T> PageResult<T> {
    pub fn new(results: Vec<T>, total_count: u64, window: Page) -> Self {
        let has_more = window.page.saturating_mul(window.size) < total_count;
        Self {
            results,
            total_count,
            page: window.page,
            size: window.size,
            next: has_more.then_some(window.page + 1),
            previous: (window.page > 1).then(|| window.page - 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            results: self.results.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            size: self.size,
            next: self.next,
            previous: self.previous,
        }
    }
}
