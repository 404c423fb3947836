/// Runtime configuration, read from the environment with fixed defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: String,
    /// Products revealed per "load more" step
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub price_min: f64,
    pub price_max: f64,
    /// Events shown on the admin dashboard
    pub recent_events: usize,
    pub seed_mock_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: "storefront.db".to_string(),
            page_size: 12,
            search_debounce_ms: 300,
            price_min: 0.0,
            price_max: 1000.0,
            recent_events: 50,
            seed_mock_data: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            store_path: std::env::var("STORE_PATH").unwrap_or(d.store_path),
            page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(d.page_size),
            search_debounce_ms: std::env::var("SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.search_debounce_ms),
            price_min: std::env::var("PRICE_MIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.price_min),
            price_max: std::env::var("PRICE_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.price_max),
            recent_events: std::env::var("RECENT_EVENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.recent_events),
            seed_mock_data: std::env::var("SEED_MOCK_DATA")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(d.seed_mock_data),
        }
    }
}
