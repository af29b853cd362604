//! Multichannel fractional delay line for the wow/flutter modulation path.

/// Ring-buffered delay with linear interpolation between adjacent samples.
/// One buffer per channel; capacity is fixed at construction so the process
/// path never allocates.
pub struct DelayLine {
  buffers: Vec<Vec<f32>>,
  write: Vec<usize>,
  capacity: usize,
}

impl DelayLine {
  pub fn new(num_channels: usize, capacity_samples: usize) -> Self {
    let capacity = capacity_samples.max(2);
    Self {
      buffers: (0..num_channels).map(|_| vec![0.0; capacity]).collect(),
      write: vec![0; num_channels],
      capacity,
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  #[inline]
  pub fn push(&mut self, channel: usize, sample: f32) {
    let w = self.write[channel];
    self.buffers[channel][w] = sample;
    self.write[channel] = (w + 1) % self.capacity;
  }

  /// Read `delay_samples` behind the most recent `push` on `channel`, with
  /// linear interpolation on the fractional part. A delay of 0.0 returns the
  /// sample just pushed. Delays beyond capacity clamp to the oldest pair.
  #[inline]
  pub fn pop(&mut self, channel: usize, delay_samples: f32) -> f32 {
    let delay = delay_samples.clamp(0.0, (self.capacity - 2) as f32);
    let whole = delay as usize;
    let frac = delay - whole as f32;
    let w = self.write[channel];
    // write already advanced past the newest sample
    let newest = (w + self.capacity - 1) % self.capacity;
    let i0 = (newest + self.capacity - whole) % self.capacity;
    let i1 = (i0 + self.capacity - 1) % self.capacity;
    let buf = &self.buffers[channel];
    let a = buf[i0];
    let b = buf[i1];
    a + (b - a) * frac
  }

  pub fn reset(&mut self) {
    for b in &mut self.buffers {
      b.fill(0.0);
    }
    for w in &mut self.write {
      *w = 0;
    }
  }
}
