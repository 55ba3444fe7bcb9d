//! Configuration for persistent sessions
//!
//! Settings cover the cache lifecycle (path, timeout, trigger), the network
//! surface (proxies, user agent, timeouts) and logging.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    CacheSettings, DEFAULT_CACHE_TIMEOUT_SECS, DEFAULT_USER_AGENT, LoggingSettings,
    NetworkSettings, Settings,
};
