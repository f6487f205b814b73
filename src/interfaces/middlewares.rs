pub mod cors;
pub mod internal_errors;
pub mod rate_limit;
pub mod security_headers;
