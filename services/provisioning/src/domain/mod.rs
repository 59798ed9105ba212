pub mod compensation;
pub mod login;
pub mod policy;
pub mod repository;
pub mod request;
pub mod types;
