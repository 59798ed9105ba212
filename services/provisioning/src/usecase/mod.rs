pub mod caller;
pub mod provision;
