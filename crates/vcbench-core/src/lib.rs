pub mod errors;
pub mod exec;
pub mod outcomes;
pub mod report;
pub mod stopwatch;
pub mod table;
pub mod units;

pub use errors::*;
pub use exec::*;
pub use outcomes::*;
pub use report::*;
pub use stopwatch::*;
pub use table::*;
pub use units::*;
