pub mod config;
pub mod doctor;
pub mod file_size;
pub mod fs_limit;
pub mod many_files;
pub mod util;

pub use config::*;
pub use doctor::*;
pub use util::*;
