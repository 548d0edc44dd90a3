// Middleware for request logging, security headers, rate limiting

pub mod rate_limiter;
pub mod request_logging;
pub mod security_headers;

pub use rate_limiter::*;
pub use request_logging::*;
pub use security_headers::*;
