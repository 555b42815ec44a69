use std::str::FromStr;

pub fn positive_usize_parser(s: &str) -> Result<usize, String> {
    let s = s.trim();
    usize::from_str(s)
        .map_err(|e| format!("Invalid count '{}': {}", s, e))
        .and_then(|v| {
            if v == 0 {
                Err("Value must be positive, got 0".to_string())
            } else {
                Ok(v)
            }
        })
}

pub fn positive_f64_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid value '{}': {}", s, e))
        .and_then(|v| {
            if v.is_finite() && v > 0.0 {
                Ok(v)
            } else {
                Err(format!("Value must be positive, got {}", v))
            }
        })
}

/// Seconds to (possibly fractional) sample counts, as framing expects.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> f64 {
    seconds * sample_rate as f64
}
