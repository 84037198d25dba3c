//! Cursus: learning-management backend with payment verification,
//! registration-code linking, and certificate issuance over hosted
//! object storage.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
