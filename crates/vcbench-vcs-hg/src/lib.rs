pub mod hg;

pub use hg::*;
