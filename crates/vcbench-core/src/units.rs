//! Conversions between large numbers and human-readable prefixes, plus the
//! magnitude arithmetic the sweep loops use.

/// Human-readable size with binary prefixes and an arbitrary suffix.
pub fn hsize_suffix(num: u64, suffix: &str) -> String {
    let mut n = num as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if n < 1024.0 {
            return format!("{:3.1}{}{}", n, unit, suffix);
        }
        n /= 1024.0;
    }
    format!("{:.1}Yi{}", n, suffix)
}

pub fn hsize(num: u64) -> String {
    hsize_suffix(num, "B")
}

/// Human-readable count (no suffix), binary prefixes.
pub fn hcount(num: u64) -> String {
    hsize_suffix(num, "")
}

/// Human-readable number with decimal prefixes.
pub fn hsize10(num: u64) -> String {
    let mut n = num as f64;
    for unit in ["", "k", "M", "G", "T", "P", "E", "Z"] {
        if n < 1000.0 {
            return format!("{:3.1}{}", n, unit);
        }
        n /= 1000.0;
    }
    format!("{:.1}Y", n)
}

/// Floor of log base 2; 0 maps to 0.
pub fn log2(num: u64) -> u32 {
    num.checked_ilog2().unwrap_or(0)
}

/// Number of hex digits required to represent a number. One digit for 0.
pub fn hexlength(num: u64) -> u32 {
    log2(num) / 4 + 1
}

/// Number of base-ten digits required to represent a number.
pub fn digitlength(num: u64) -> u32 {
    if num == 0 {
        1
    } else {
        num.ilog10() + 1
    }
}

/// Trial sizes for a base-10 sweep: each order of magnitude in
/// `start_mag..end_mag`, subdivided into `mag_steps` evenly spaced steps.
pub fn base10_trials(start_mag: u32, end_mag: u32, mag_steps: u64) -> Vec<u64> {
    let mut trials = Vec::new();
    for mag in start_mag..end_mag {
        let base = 10u64.pow(mag);
        trials.push(base);
        for step in 1..mag_steps {
            let trial = 10u64.pow(mag + 1) / mag_steps * step;
            if trial != base {
                trials.push(trial);
            }
        }
    }
    trials
}

/// Trial sizes for a base-2 sweep, same subdivision scheme.
pub fn base2_trials(start_mag: u32, end_mag: u32, mag_steps: u64) -> Vec<u64> {
    let mut trials = Vec::new();
    for mag in start_mag..end_mag {
        let base = 1u64 << mag;
        for step in 0..mag_steps {
            let trial = base + (base / mag_steps) * step;
            if step == 0 || trial != base {
                trials.push(trial);
            }
        }
    }
    trials
}
