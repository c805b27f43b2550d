pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod report;

#[cfg(test)]
mod test_support;
