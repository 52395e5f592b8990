pub mod bup;

pub use bup::*;
