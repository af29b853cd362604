//! RBJ cookbook biquads for the parallel filter paths.

use std::f32::consts::PI;

/// One set of normalized biquad coefficients. Cheap to copy; recomputed per
/// block from the current control values and handed to the stateful filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
  pub b0: f32,
  pub b1: f32,
  pub b2: f32,
  pub a1: f32,
  pub a2: f32,
}

impl BiquadCoeffs {
  pub const IDENTITY: Self = Self { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0 };

  /// Peaking EQ centered on `freq_hz`. Gains within a fraction of a dB of
  /// flat collapse to the identity filter.
  pub fn peaking(sample_rate: f32, freq_hz: f32, q: f32, gain_db: f32) -> Self {
    if gain_db.abs() < 1e-3 {
      return Self::IDENTITY;
    }
    let a = 10.0_f32.powf(gain_db / 40.0);
    let w0 = 2.0 * PI * freq_hz / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha / a;

    Self { b0: b0 / a0, b1: b1 / a0, b2: b2 / a0, a1: a1 / a0, a2: a2 / a0 }
  }

  /// High shelf with corner at `freq_hz`.
  pub fn high_shelf(sample_rate: f32, freq_hz: f32, q: f32, gain_db: f32) -> Self {
    if gain_db.abs() < 1e-3 {
      return Self::IDENTITY;
    }
    let a = 10.0_f32.powf(gain_db / 40.0);
    let w0 = 2.0 * PI * freq_hz / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);
    let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w0);
    let a2 = (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha;

    Self { b0: b0 / a0, b1: b1 / a0, b2: b2 / a0, a1: a1 / a0, a2: a2 / a0 }
  }
}

/// Transposed direct form II biquad. Coefficients can change between blocks
/// without touching the state registers.
#[derive(Clone, Debug, Default)]
pub struct Biquad {
  b0: f32,
  b1: f32,
  b2: f32,
  a1: f32,
  a2: f32,
  z1: f32,
  z2: f32,
}

impl Biquad {
  pub fn new() -> Self {
    let mut f = Self::default();
    f.set_coefficients(BiquadCoeffs::IDENTITY);
    f
  }

  pub fn set_coefficients(&mut self, c: BiquadCoeffs) {
    self.b0 = c.b0;
    self.b1 = c.b1;
    self.b2 = c.b2;
    self.a1 = c.a1;
    self.a2 = c.a2;
  }

  #[inline]
  pub fn tick(&mut self, x: f32) -> f32 {
    let y = self.b0 * x + self.z1;
    self.z1 = self.b1 * x - self.a1 * y + self.z2;
    self.z2 = self.b2 * x - self.a2 * y;
    y
  }

  /// Filter `input` into `output` without touching the source buffer. Both
  /// slices must have the same length.
  pub fn process_into(&mut self, input: &[f32], output: &mut [f32]) {
    debug_assert_eq!(input.len(), output.len());
    for (x, y) in input.iter().zip(output.iter_mut()) {
      *y = self.tick(*x);
    }
  }

  pub fn reset(&mut self) {
    self.z1 = 0.0;
    self.z2 = 0.0;
  }
}
