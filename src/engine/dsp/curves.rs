//! Control-value to DSP-coefficient mappings shared by the engines.

/// Linear remap of `v` from [in0, in1] to [out0, out1]. No clamping; callers
/// clamp the control first.
#[inline]
pub fn map(v: f32, in0: f32, in1: f32, out0: f32, out1: f32) -> f32 {
  out0 + (out1 - out0) * ((v - in0) / (in1 - in0))
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
  10.0_f32.powf(db / 20.0)
}

/// Progressive drive curve for the tape stage.
///
/// 0..0.3 stays nearly transparent (pre-tanh gain 1..2), 0.3..0.7 is moderate
/// warmth (2..8), 0.7..1.0 clips hard (8..20). The segments share endpoints,
/// so the curve is continuous at both breakpoints.
pub fn drive_to_gain(drive: f32) -> f32 {
  let d = drive.clamp(0.0, 1.0);
  if d <= 0.3 {
    map(d, 0.0, 0.3, 1.0, 2.0)
  } else if d <= 0.7 {
    map(d, 0.3, 0.7, 2.0, 8.0)
  } else {
    map(d, 0.7, 1.0, 8.0, 20.0)
  }
}

/// Decay time (seconds) to reverb damping, inverse linear: short tails lose
/// energy fast per reflection (0.1 s -> 0.9), long tails barely at all
/// (10 s -> 0.1).
pub fn decay_to_damping(decay_s: f32) -> f32 {
  map(decay_s.clamp(0.1, 10.0), 0.1, 10.0, 0.9, 0.1)
}

// Crossfade steepness and crossover for the parallel filter paths. Tuned by
// ear; the exact shape is a design parameter, not a correctness requirement.
const XFADE_K: f32 = 0.6;
const XFADE_X0: f32 = 0.0;

/// Complementary exponential fade pair for the filter bank.
///
/// `x` is the raw control value (0..10). Path A dominates at low settings
/// (`weight_a = exp(-k*x)`), path B takes over towards the top of the range
/// (`weight_b = 1 - exp(-k*(x - x0))`, zero at the crossover). Both weights
/// stay within [0, 1].
pub fn crossfade_weights(x: f32) -> (f32, f32) {
  let a = (-XFADE_K * x).exp().clamp(0.0, 1.0);
  let b = (1.0 - (-XFADE_K * (x - XFADE_X0)).exp()).clamp(0.0, 1.0);
  (a, b)
}
