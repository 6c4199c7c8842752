pub mod circuit_breaker;
pub mod domain;
pub mod health;
pub mod request;
pub mod response;
pub mod result;
pub mod retry;
pub mod status;
pub mod template;
pub mod validation;
