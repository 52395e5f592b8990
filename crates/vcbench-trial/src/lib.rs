//! Scoped verification of risky repository operations.
//!
//! A benchmark that measures a tool at its breaking point cannot trust the
//! tool's exit codes: near the limit, commands fail after succeeding and
//! succeed after failing. Every risky step therefore runs inside nested
//! verification scopes that classify what actually happened, using the
//! adapter's observation points, no matter how the step itself exited.

pub mod step;
pub mod verify;

pub use step::*;
pub use verify::*;
