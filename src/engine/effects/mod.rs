pub mod filter_bank;
pub mod reverb;
pub mod tape;

use std::sync::Arc;

use crate::engine::params::ParamStore;
use crate::engine::spec::{EngineError, ProcessSpec};

/// Common lifecycle for the block-processing engines.
///
/// An engine starts Unconfigured. `prepare` validates the spec, allocates all
/// derived state and moves it to Ready; `process` is then callable from the
/// audio thread without allocating or locking. `reset` drops the derived
/// state and returns to Unconfigured. Processing while Unconfigured is an
/// error, never a crash.
pub trait Engine {
  /// Build or rebuild all processing state for `spec`. On error the engine
  /// stays (or becomes) Unconfigured.
  fn prepare(&mut self, spec: ProcessSpec) -> Result<(), EngineError>;

  /// Drop all derived state and return to Unconfigured. Parameter values
  /// are untouched; they live in the shared store, not the engine.
  fn reset(&mut self);

  /// Process one planar block in place. Each inner slice is one channel.
  fn process(&mut self, block: &mut [&mut [f32]]) -> Result<(), EngineError>;

  /// The shared control store for this engine instance.
  fn params(&self) -> &Arc<ParamStore>;

  /// Fixed processing latency in frames at the configured rate. Zero while
  /// Unconfigured.
  fn latency_frames(&self) -> usize {
    0
  }
}
