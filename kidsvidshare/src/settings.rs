//! Content service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `KIDSVIDSHARE_*` environment variables or a
//! config file. Every field is optional; accessors fall back to the product
//! defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::PageRequest;
use serde::Deserialize;

/// Lifetime of signed playback URLs.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3_600;
/// Largest accepted video upload (500 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;
pub const DEFAULT_PAGE_SIZE: u32 = pagination::DEFAULT_LIMIT;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_FEATURED_LIMIT: u32 = 10;

/// Tunables for [`ContentService`](crate::domain::ContentService).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KIDSVIDSHARE")]
pub struct ContentSettings {
    /// Seconds a signed playback URL stays valid.
    pub signed_url_ttl_secs: Option<u64>,
    /// Upper bound on uploaded video size in bytes.
    pub max_upload_bytes: Option<u64>,
    /// Gallery page size used when the caller does not ask for one.
    pub default_page_size: Option<u32>,
    /// Largest gallery page size a caller may request.
    pub max_page_size: Option<u32>,
    /// Number of featured videos returned by default.
    pub featured_limit: Option<u32>,
}

impl ContentSettings {
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(
            self.signed_url_ttl_secs
                .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
        )
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE).max(1)
    }

    /// Default page size, never above [`max_page_size`](Self::max_page_size).
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, self.max_page_size())
    }

    pub fn featured_limit(&self) -> u32 {
        self.featured_limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, self.max_page_size())
    }

    /// Clamp a caller's page request to the configured maximum size.
    pub fn clamp_page(&self, request: PageRequest) -> PageRequest {
        let limit = request.limit().min(self.max_page_size());
        PageRequest::new(request.page(), limit, self.max_page_size())
            .unwrap_or_else(|_| PageRequest::first(self.default_page_size()))
    }

    /// First page at the default size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.default_page_size())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for content configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "KIDSVIDSHARE_SIGNED_URL_TTL_SECS",
        "KIDSVIDSHARE_MAX_UPLOAD_BYTES",
        "KIDSVIDSHARE_DEFAULT_PAGE_SIZE",
        "KIDSVIDSHARE_MAX_PAGE_SIZE",
        "KIDSVIDSHARE_FEATURED_LIMIT",
    ];

    fn load_from_empty_args() -> ContentSettings {
        ContentSettings::load_from_iter([OsString::from("kidsvidshare")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.signed_url_ttl(), Duration::from_secs(3_600));
        assert_eq!(settings.max_upload_bytes(), 524_288_000);
        assert_eq!(settings.default_page_size(), 20);
        assert_eq!(settings.max_page_size(), 100);
        assert_eq!(settings.featured_limit(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("KIDSVIDSHARE_SIGNED_URL_TTL_SECS", Some("60".to_owned())),
            ("KIDSVIDSHARE_MAX_UPLOAD_BYTES", Some("1024".to_owned())),
            ("KIDSVIDSHARE_DEFAULT_PAGE_SIZE", Some("12".to_owned())),
            ("KIDSVIDSHARE_MAX_PAGE_SIZE", Some("24".to_owned())),
            ("KIDSVIDSHARE_FEATURED_LIMIT", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.signed_url_ttl(), Duration::from_secs(60));
        assert_eq!(settings.max_upload_bytes(), 1_024);
        assert_eq!(settings.default_page_size(), 12);
        assert_eq!(settings.max_page_size(), 24);
        assert_eq!(settings.featured_limit(), 4);
    }

    #[rstest]
    fn default_page_size_never_exceeds_maximum() {
        let settings = ContentSettings {
            default_page_size: Some(50),
            max_page_size: Some(10),
            ..ContentSettings::default()
        };
        assert_eq!(settings.default_page_size(), 10);
    }

    #[rstest]
    #[case(3, 500, 3, 100)]
    #[case(1, 20, 1, 20)]
    fn oversized_page_requests_are_clamped(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let settings = ContentSettings::default();
        let request = PageRequest::new(page, limit, u32::MAX).expect("valid request");
        let clamped = settings.clamp_page(request);
        assert_eq!(clamped.page(), expected_page);
        assert_eq!(clamped.limit(), expected_limit);
    }
}
