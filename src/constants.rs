pub mod limits {

    pub const DEFAULT_TAKE: u32 = 20;

    pub const MAX_TAKE: u32 = 1000;

    /// Page size used when walking the upstream request list.
    pub const UPSTREAM_PAGE_SIZE: u32 = 20;
}

pub mod defaults {

    pub const UNKNOWN_MOVIE_TITLE: &str = "Unknown Title";

    pub const UNKNOWN_TV_TITLE: &str = "Unknown TV Show";

    pub const REQUEST_TIMEOUT_SECONDS: u32 = 30;
}

pub mod metrics {

    pub const STATUS_CODE_DRIFT: &str = "overseerr_status_code_drift_total";

    pub const PROJECTION_FAILURES: &str = "overseerr_projection_failures_total";
}
