use confique::Config as _;
use std::sync::OnceLock;

#[derive(confique::Config)]
pub struct Config {
    /// Try the structured PL/pgSQL extraction path (§4.8 strategy 1) before
    /// falling back to the line-based statement splitter. Disabling this is
    /// mostly useful for testing the fallback path in isolation.
    #[config(env = "GREPSQL_STRUCTURED_PLPGSQL", default = true)]
    pub structured_plpgsql_extraction: bool,

    /// Initial capacity hint for each evaluation's capture store.
    #[config(env = "GREPSQL_CAPTURE_CAPACITY_HINT", default = 4)]
    pub capture_capacity_hint: usize,

    /// Maximum number of compiled patterns retained in the pattern cache.
    #[config(env = "GREPSQL_PATTERN_CACHE_SIZE", default = 256)]
    pub pattern_cache_size: u64,
}

pub fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(|| {
        Config::builder()
            .env()
            .load()
            .expect("Failed to load one or more value configuration from the current environment")
    })
}
