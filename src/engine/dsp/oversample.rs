//! 2x oversampling for the saturation stage.
//!
//! Upsampling is polyphase windowed-sinc interpolation (8 taps per phase,
//! Blackman-Harris window); downsampling runs a 48-tap Kaiser-windowed sinc
//! FIR (beta 8, cutoff 0.45x the oversampled Nyquist, >80 dB stopband) before
//! decimating. Both filters are symmetric, so the path is linear phase and
//! bit-for-bit deterministic for a fixed input. All state is per channel and
//! allocated once at construction.

use crate::engine::spec::EngineError;

const UP_TAPS: usize = 8;
const DOWN_TAPS: usize = 48;

struct ChannelState {
  up_hist: [f32; UP_TAPS],
  up_pos: usize,
  down_hist: [f32; DOWN_TAPS],
}

impl ChannelState {
  fn new() -> Self {
    Self { up_hist: [0.0; UP_TAPS], up_pos: 0, down_hist: [0.0; DOWN_TAPS] }
  }

  fn reset(&mut self) {
    self.up_hist = [0.0; UP_TAPS];
    self.up_pos = 0;
    self.down_hist = [0.0; DOWN_TAPS];
  }
}

pub struct Oversampler {
  factor: usize,
  max_frames: usize,
  channels: Vec<ChannelState>,
  work: Vec<Vec<f32>>,
}

impl Oversampler {
  /// Only factor 2 (a single half-band stage) is supported; anything else is
  /// a configuration error.
  pub fn new(factor: usize, num_channels: usize, max_frames: usize) -> Result<Self, EngineError> {
    if factor != 2 {
      return Err(EngineError::UnsupportedOversampleFactor(factor));
    }
    Ok(Self {
      factor,
      max_frames,
      channels: (0..num_channels).map(|_| ChannelState::new()).collect(),
      work: (0..num_channels).map(|_| vec![0.0; max_frames * factor]).collect(),
    })
  }

  pub fn factor(&self) -> usize {
    self.factor
  }

  /// Group delay of the full up/down path in frames at the base rate.
  pub fn latency_frames(&self) -> usize {
    UP_TAPS / 2 + (DOWN_TAPS - 1) / 2 / self.factor
  }

  /// Band-limit and expand `input` into the oversampled working buffer for
  /// `channel`, returning the `factor * input.len()` samples for in-place
  /// shaping.
  pub fn upsample(&mut self, channel: usize, input: &[f32]) -> Result<&mut [f32], EngineError> {
    if channel >= self.channels.len() {
      return Err(EngineError::ChannelMismatch { got: channel + 1, want: self.channels.len() });
    }
    if input.len() > self.max_frames {
      return Err(EngineError::BlockTooLarge { got: input.len(), max: self.max_frames });
    }
    let st = &mut self.channels[channel];
    let work = &mut self.work[channel];
    for (n, &x) in input.iter().enumerate() {
      st.up_hist[st.up_pos] = x;
      st.up_pos = (st.up_pos + 1) % UP_TAPS;
      for (p, kernel) in UPSAMPLE_KERNEL.iter().enumerate() {
        let mut acc = 0.0;
        for (t, &k) in kernel.iter().enumerate() {
          // history in oldest-to-newest order
          acc += st.up_hist[(st.up_pos + t) % UP_TAPS] * k;
        }
        // rows sum to 1/factor; scale back to unity DC gain
        work[n * 2 + p] = acc * 2.0;
      }
    }
    Ok(&mut work[..input.len() * 2])
  }

  /// Anti-alias filter the working buffer and decimate back into `output`.
  /// Must be paired with an `upsample` call of the same frame count.
  pub fn downsample(&mut self, channel: usize, output: &mut [f32]) -> Result<(), EngineError> {
    if channel >= self.channels.len() {
      return Err(EngineError::ChannelMismatch { got: channel + 1, want: self.channels.len() });
    }
    if output.len() > self.max_frames {
      return Err(EngineError::BlockTooLarge { got: output.len(), max: self.max_frames });
    }
    let st = &mut self.channels[channel];
    let work = &self.work[channel];
    for (n, out) in output.iter_mut().enumerate() {
      // push both oversampled samples through the FIR delay line, evaluate
      // the convolution only at the decimation point
      for p in 0..2 {
        for j in (1..DOWN_TAPS).rev() {
          st.down_hist[j] = st.down_hist[j - 1];
        }
        st.down_hist[0] = work[n * 2 + p];
      }
      let mut acc = 0.0;
      for (j, &c) in DOWN_COEFFS.iter().enumerate() {
        acc += st.down_hist[j] * c;
      }
      *out = acc;
    }
    Ok(())
  }

  /// Zero all filter history without reallocating.
  pub fn reset(&mut self) {
    for c in &mut self.channels {
      c.reset();
    }
    for w in &mut self.work {
      w.fill(0.0);
    }
  }
}

// Half-band lowpass FIR for decimation: Kaiser-windowed sinc, beta 8.0,
// cutoff 0.45x the oversampled Nyquist. 48 taps, symmetric (linear phase),
// coefficients sum to 1.0 (unity DC gain).
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static DOWN_COEFFS: [f32; DOWN_TAPS] = [
     0.000_030_805,  0.000_036_066, -0.000_173_870, -0.000_246_921,
     0.000_420_167,  0.000_880_584, -0.000_601_289, -0.002_237_806,
     0.000_256_421,  0.004_509_578,  0.001_430_439, -0.007_530_765,
    -0.005_580_807,  0.010_513_124,  0.013_481_583, -0.011_805_484,
    -0.026_534_781,  0.008_541_637,  0.046_881_021,  0.004_832_767,
    -0.081_356_477, -0.046_700_191,  0.178_198_253,  0.412_755_947,
     0.412_755_947,  0.178_198_253, -0.046_700_191, -0.081_356_477,
     0.004_832_767,  0.046_881_021,  0.008_541_637, -0.026_534_781,
    -0.011_805_484,  0.013_481_583,  0.010_513_124, -0.005_580_807,
    -0.007_530_765,  0.001_430_439,  0.004_509_578,  0.000_256_421,
    -0.002_237_806, -0.000_601_289,  0.000_880_584,  0.000_420_167,
    -0.000_246_921, -0.000_173_870,  0.000_036_066,  0.000_030_805,
];

// Polyphase interpolation kernel: Blackman-Harris windowed sinc, one row per
// output phase. Phase 0 interpolates the half-sample point; phase 1 lands on
// the integer sample (identity tap). Each row sums to 0.5 and is scaled by
// the factor at run time.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static UPSAMPLE_KERNEL: [[f32; UP_TAPS]; 2] = [
    [ -0.000_002_729,  0.002_126_604, -0.035_328_366,  0.283_204_492,
       0.283_204_492, -0.035_328_366,  0.002_126_604, -0.000_002_729 ],
    [  0.000_000_000,  0.000_000_000,  0.000_000_000,  0.000_000_000,
       0.500_000_000,  0.000_000_000,  0.000_000_000,  0.000_000_000 ],
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_unsupported_factor() {
    assert_eq!(
      Oversampler::new(3, 2, 64).err(),
      Some(EngineError::UnsupportedOversampleFactor(3))
    );
    assert!(Oversampler::new(2, 2, 64).is_ok());
  }

  #[test]
  fn silence_in_silence_out() {
    let mut ovs = Oversampler::new(2, 1, 64).unwrap();
    let input = [0.0f32; 64];
    let mut output = [1.0f32; 64];
    let os = ovs.upsample(0, &input).unwrap();
    assert!(os.iter().all(|&s| s == 0.0));
    ovs.downsample(0, &mut output).unwrap();
    assert!(output.iter().all(|&s| s == 0.0));
  }

  #[test]
  fn dc_passes_at_unity_after_settling() {
    let mut ovs = Oversampler::new(2, 1, 64).unwrap();
    let input = [1.0f32; 64];
    let mut output = [0.0f32; 64];
    // a few blocks to flush the filter history
    for _ in 0..4 {
      ovs.upsample(0, &input).unwrap();
      ovs.downsample(0, &mut output).unwrap();
    }
    let last = output[63];
    assert!((last - 1.0).abs() < 0.02, "DC gain should be ~1, got {last}");
  }

  #[test]
  fn deterministic_for_fixed_input() {
    let input: Vec<f32> = (0..64).map(|i| ((i as f32) * 0.37).sin()).collect();
    let run = || {
      let mut ovs = Oversampler::new(2, 1, 64).unwrap();
      let mut out = vec![0.0f32; 64];
      ovs.upsample(0, &input).unwrap();
      ovs.downsample(0, &mut out).unwrap();
      out
    };
    assert_eq!(run(), run());
  }

  #[test]
  fn reset_restores_initial_state() {
    let input: Vec<f32> = (0..32).map(|i| (i as f32 * 0.2).cos()).collect();
    let mut ovs = Oversampler::new(2, 1, 32).unwrap();
    let mut first = vec![0.0f32; 32];
    ovs.upsample(0, &input).unwrap();
    ovs.downsample(0, &mut first).unwrap();

    ovs.reset();
    let mut second = vec![0.0f32; 32];
    ovs.upsample(0, &input).unwrap();
    ovs.downsample(0, &mut second).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn rejects_mismatched_dims() {
    let mut ovs = Oversampler::new(2, 1, 16).unwrap();
    let big = [0.0f32; 32];
    assert!(matches!(
      ovs.upsample(0, &big),
      Err(EngineError::BlockTooLarge { .. })
    ));
    assert!(matches!(
      ovs.upsample(1, &big[..8]),
      Err(EngineError::ChannelMismatch { .. })
    ));
  }

  #[test]
  fn latency_is_a_handful_of_frames() {
    let ovs = Oversampler::new(2, 1, 16).unwrap();
    let l = ovs.latency_frames();
    assert!(l > 0 && l < 32);
  }
}
