mod http;
mod traits;

pub use http::{HttpActivityClient, DEFAULT_ENDPOINT};
pub use traits::*;
