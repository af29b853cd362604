//! Dry signal capture and equal-gain dry/wet blending.

/// Holds a copy of the unprocessed block so the effect can run fully wet and
/// blend afterwards. Mix is linear: `out = dry * (1 - mix) + wet * mix`, so
/// mix 0.0 reproduces the dry input exactly and mix 1.0 the wet path exactly.
pub struct DryWetMixer {
  dry: Vec<Vec<f32>>,
  frames: usize,
}

impl DryWetMixer {
  pub fn new(num_channels: usize, max_frames: usize) -> Self {
    Self {
      dry: (0..num_channels).map(|_| vec![0.0; max_frames]).collect(),
      frames: 0,
    }
  }

  /// Snapshot the block before the wet path mutates it in place.
  pub fn push_dry(&mut self, block: &[&mut [f32]]) {
    self.frames = block.first().map(|ch| ch.len()).unwrap_or(0);
    for (ch, src) in block.iter().enumerate() {
      self.dry[ch][..self.frames].copy_from_slice(src);
    }
  }

  /// Blend the stored dry signal into the now-wet block.
  pub fn mix_wet(&self, block: &mut [&mut [f32]], mix: f32) {
    let mix = mix.clamp(0.0, 1.0);
    for (ch, out) in block.iter_mut().enumerate() {
      let dry = &self.dry[ch][..self.frames];
      for (y, &d) in out.iter_mut().zip(dry.iter()) {
        *y = d * (1.0 - mix) + *y * mix;
      }
    }
  }

  pub fn reset(&mut self) {
    for ch in &mut self.dry {
      ch.fill(0.0);
    }
    self.frames = 0;
  }
}
