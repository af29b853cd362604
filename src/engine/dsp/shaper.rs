//! Saturating nonlinearity for the tape stage.
//!
//! Runs in the oversampled domain only, so the harmonics it generates land
//! below the original Nyquist instead of aliasing back down.

/// tanh soft clipper. Bounded in (-1, 1) for any gain or input.
#[inline]
pub fn saturate(x: f32, gain: f32) -> f32 {
  (gain * x).tanh()
}

pub fn saturate_block(buf: &mut [f32], gain: f32) {
  for s in buf.iter_mut() {
    *s = saturate(*s, gain);
  }
}
