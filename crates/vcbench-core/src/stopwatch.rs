use std::time::Instant;

/// Runs `op` and stores its wall-clock duration, in seconds, into `slot`.
/// The duration is recorded however `op` exits; pair with `record_cmd`
/// and the verifiers for fallible operations.
pub fn timed<T>(slot: &mut f64, op: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = op();
    *slot = start.elapsed().as_secs_f64();
    out
}

pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
