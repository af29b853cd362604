use thiserror::Error;

/// Processing configuration supplied by the host before the first block.
///
/// Immutable once an engine is Ready; any change (a new sample rate, a larger
/// block, a different channel layout) requires a full re-`prepare`, which
/// rebuilds every piece of derived state (filter registers, delay buffers,
/// oversampling history, scratch buffers).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
  pub sample_rate: f64,
  pub max_block_frames: usize,
  pub num_channels: usize,
}

impl ProcessSpec {
  /// Reject configurations before any state is built. An engine that fails
  /// validation never leaves the Unconfigured state.
  pub fn validate(&self) -> Result<(), EngineError> {
    if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
      return Err(EngineError::InvalidSampleRate(self.sample_rate));
    }
    if self.max_block_frames == 0 {
      return Err(EngineError::ZeroBlockSize);
    }
    if self.num_channels == 0 || self.num_channels > 2 {
      return Err(EngineError::UnsupportedChannelCount(self.num_channels));
    }
    Ok(())
  }
}

/// Fatal precondition violations. Everything here is reported to the caller;
/// out-of-range *parameter* values are clamped silently instead (the store
/// pre-validates ranges, clamping is only a defensive backstop).
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
  #[error("invalid sample rate: {0} Hz")]
  InvalidSampleRate(f64),
  #[error("maximum block size must be non-zero")]
  ZeroBlockSize,
  #[error("unsupported channel count: {0} (mono or stereo only)")]
  UnsupportedChannelCount(usize),
  #[error("unsupported oversampling factor: {0}")]
  UnsupportedOversampleFactor(usize),
  #[error("process() called while unconfigured; call prepare() first")]
  NotConfigured,
  #[error("block of {got} frames exceeds configured maximum of {max}")]
  BlockTooLarge { got: usize, max: usize },
  #[error("channel count mismatch: block has {got}, engine configured for {want}")]
  ChannelMismatch { got: usize, want: usize },
  #[error("channels within one block have differing frame counts")]
  RaggedBlock,
}

/// Validate a planar block against the active spec. Returns the frame count.
/// Scratch capacity was sized once at prepare time, so an oversized block is
/// fatal rather than truncated.
pub(crate) fn check_block(spec: &ProcessSpec, block: &[&mut [f32]]) -> Result<usize, EngineError> {
  if block.len() != spec.num_channels {
    return Err(EngineError::ChannelMismatch {
      got: block.len(),
      want: spec.num_channels,
    });
  }
  let frames = block.first().map(|ch| ch.len()).unwrap_or(0);
  if frames > spec.max_block_frames {
    return Err(EngineError::BlockTooLarge {
      got: frames,
      max: spec.max_block_frames,
    });
  }
  if block.iter().any(|ch| ch.len() != frames) {
    return Err(EngineError::RaggedBlock);
  }
  Ok(frames)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spec(sr: f64, frames: usize, ch: usize) -> ProcessSpec {
    ProcessSpec {
      sample_rate: sr,
      max_block_frames: frames,
      num_channels: ch,
    }
  }

  #[test]
  fn accepts_common_configs() {
    assert_eq!(spec(44100.0, 512, 2).validate(), Ok(()));
    assert_eq!(spec(48000.0, 64, 1).validate(), Ok(()));
    assert_eq!(spec(192000.0, 4096, 2).validate(), Ok(()));
  }

  #[test]
  fn rejects_bad_sample_rate() {
    assert_eq!(
      spec(0.0, 512, 2).validate(),
      Err(EngineError::InvalidSampleRate(0.0))
    );
    assert_eq!(
      spec(-48000.0, 512, 2).validate(),
      Err(EngineError::InvalidSampleRate(-48000.0))
    );
    assert!(spec(f64::NAN, 512, 2).validate().is_err());
  }

  #[test]
  fn rejects_zero_block() {
    assert_eq!(spec(48000.0, 0, 2).validate(), Err(EngineError::ZeroBlockSize));
  }

  #[test]
  fn rejects_unsupported_channels() {
    assert_eq!(
      spec(48000.0, 512, 0).validate(),
      Err(EngineError::UnsupportedChannelCount(0))
    );
    assert_eq!(
      spec(48000.0, 512, 6).validate(),
      Err(EngineError::UnsupportedChannelCount(6))
    );
  }

  #[test]
  fn check_block_enforces_dims() {
    let s = spec(48000.0, 4, 2);
    let mut l = [0.0f32; 4];
    let mut r = [0.0f32; 4];
    {
      let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
      assert_eq!(check_block(&s, &block), Ok(4));
      block[1] = &mut [];
      assert_eq!(check_block(&s, &block), Err(EngineError::RaggedBlock));
    }
    let mut big = [0.0f32; 8];
    let mut big2 = [0.0f32; 8];
    let block: [&mut [f32]; 2] = [&mut big, &mut big2];
    assert_eq!(
      check_block(&s, &block),
      Err(EngineError::BlockTooLarge { got: 8, max: 4 })
    );
    let mut mono = [0.0f32; 4];
    let block: [&mut [f32]; 1] = [&mut mono];
    assert_eq!(
      check_block(&s, &block),
      Err(EngineError::ChannelMismatch { got: 1, want: 2 })
    );
  }
}
