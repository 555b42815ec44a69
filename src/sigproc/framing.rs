use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::sigproc::Window;

/// `y[0] = x[0]`, `y[n] = x[n] - coeff * x[n-1]`. A coefficient of 0 leaves
/// the signal untouched.
pub fn preemphasize(signal: &[f64], coeff: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(signal.len());
    if let Some(&first) = signal.first() {
        out.push(first);
    }
    out.extend(signal.windows(2).map(|pair| pair[1] - coeff * pair[0]));
    out
}

/// Overlapping windowed frames of one signal, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    frame_len: usize,
    frame_step: usize,
    data: Vec<f64>,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.data.len() / self.frame_len
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn frame_step(&self) -> usize {
        self.frame_step
    }

    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.frame_len)?;
        let end = start.checked_add(self.frame_len)?;
        self.data.get(start..end)
    }

    pub fn iter(&self) -> std::slice::Chunks<'_, f64> {
        self.data.chunks(self.frame_len)
    }

    pub fn par_iter(&self) -> rayon::slice::Chunks<'_, f64> {
        self.data.par_chunks(self.frame_len)
    }
}

fn round_samples(value: f64) -> Option<usize> {
    let rounded = value.round_ties_even();
    if rounded.is_finite() && rounded >= 1.0 {
        Some(rounded as usize)
    } else {
        None
    }
}

/// Frames `signal` with the given window shape.
pub fn frame(signal: &[f64], frame_len: f64, frame_step: f64, window: Window) -> Result<FrameSet> {
    frame_with(signal, frame_len, frame_step, |n| window.coefficients(n))
}

/// Frames `signal` into `1 + ceil((len - frame_len) / frame_step)` frames
/// (a single frame when the signal fits in one), zero-padding the tail so
/// the last frame is complete, and multiplies each frame by the window
/// produced by `window_fn(frame_len)`.
///
/// Lengths are given in samples and rounded to the nearest integer, ties to
/// even. Geometry whose padded length overflows `usize` is rejected.
pub fn frame_with<W>(signal: &[f64], frame_len: f64, frame_step: f64, window_fn: W) -> Result<FrameSet>
where
    W: Fn(usize) -> Vec<f64>,
{
    let (len, step) = match (round_samples(frame_len), round_samples(frame_step)) {
        (Some(len), Some(step)) => (len, step),
        _ => return Err(Error::InvalidFramingParameters { frame_len, frame_step }),
    };

    let invalid = || Error::InvalidFramingParameters { frame_len, frame_step };

    let num_frames = if signal.len() <= len {
        1
    } else {
        1 + (signal.len() - len).div_ceil(step)
    };
    let padded_len = (num_frames - 1)
        .checked_mul(step)
        .and_then(|offset| offset.checked_add(len))
        .ok_or_else(invalid)?;
    let total = num_frames.checked_mul(len).ok_or_else(invalid)?;

    let window = window_fn(len);
    if window.len() != len {
        return Err(Error::DimensionMismatch { expected: len, found: window.len() });
    }

    debug!(
        "Framing {} samples: {} frames of {} (step {}), padded to {}",
        signal.len(),
        num_frames,
        len,
        step,
        padded_len
    );

    let mut data = Vec::with_capacity(total);
    for i in 0..num_frames {
        let start = i.checked_mul(step).ok_or_else(invalid)?;
        data.extend(window.iter().enumerate().map(|(j, w)| {
            let sample = start.checked_add(j).and_then(|k| signal.get(k)).copied();
            sample.unwrap_or(0.0) * w
        }));
    }

    Ok(FrameSet { frame_len: len, frame_step: step, data })
}
