pub mod circuit_breaker;
pub mod email;
pub mod health;
pub mod sms;
