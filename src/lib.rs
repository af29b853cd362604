//! Real-time audio effect engines.
//!
//! Three block-oriented effect processors built on a small shared DSP kit:
//!
//! - [`TapeAge`]: oversampled tanh tape saturation plus wow/flutter pitch
//!   modulation through a 100 ms delay line.
//! - [`FilterBank`]: two parallel IIR paths (treble shelf, midrange peak)
//!   recombined through complementary exponential crossfade weights.
//! - [`FlutterVerb`]: algorithmic reverb run full-wet behind a dry/wet mixer
//!   that owns the blend.
//!
//! Every engine follows the same lifecycle: [`Engine::prepare`] with a
//! validated [`ProcessSpec`] allocates all buffers up front, then
//! [`Engine::process`] mutates planar blocks in place with no allocation,
//! locking, or blocking. Control values arrive through a lock-free
//! [`ParamStore`] written from any other thread and snapshotted once per
//! block via single-word atomic loads.

pub mod engine {
  pub mod params;
  pub mod spec;
  pub mod dsp;
  pub mod effects;
}

pub use engine::effects::filter_bank::FilterBank;
pub use engine::effects::reverb::FlutterVerb;
pub use engine::effects::tape::TapeAge;
pub use engine::effects::Engine;
pub use engine::params::{hash_path, ParamDef, ParamStore};
pub use engine::spec::{EngineError, ProcessSpec};
