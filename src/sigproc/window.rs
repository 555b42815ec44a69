use std::f64::consts::PI;
use std::str::FromStr;

/// Analysis window applied to every frame of a `FrameSet`.
///
/// Symmetric definitions: coefficient `i` equals coefficient `len - 1 - i`,
/// and a window of length 1 is a single unit coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Hamming,
    Hann,
    Rectangular,
}

impl Window {
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        match len {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let denom = (len - 1) as f64;
                (0..len)
                    .map(|n| {
                        let phase = 2.0 * PI * n as f64 / denom;
                        match self {
                            Window::Hamming => 0.54 - 0.46 * phase.cos(),
                            Window::Hann => 0.5 - 0.5 * phase.cos(),
                            Window::Rectangular => 1.0,
                        }
                    })
                    .collect()
            }
        }
    }
}

impl FromStr for Window {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hamming" => Ok(Window::Hamming),
            "hann" | "hanning" => Ok(Window::Hann),
            "rect" | "rectangular" | "none" => Ok(Window::Rectangular),
            other => Err(anyhow::anyhow!("Unknown window: {}", other)),
        }
    }
}
