//! Request models

mod verify_request;

pub use verify_request::VerifyRequest;
