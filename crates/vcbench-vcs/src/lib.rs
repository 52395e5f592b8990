pub mod contract;
pub mod scripted;
pub mod types;

pub use types::*;
