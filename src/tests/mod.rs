#[cfg(test)]
pub mod common;

mod token_cache_lifecycle;
