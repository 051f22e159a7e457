//! Configuration structs with serde defaults and fail-fast validation.

pub mod cache_config;
pub mod defaults;
pub mod preloader_config;

pub use cache_config::CacheConfig;
pub use preloader_config::PreloaderConfig;
