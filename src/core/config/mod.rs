pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, ConfigKey, ResolvedConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
