//! Adaptive parallel filtering.
//!
//! Two filter paths run side by side from the same input: a high shelf and a
//! midrange peaking EQ. A single control sweeps the voicing from one path to
//! the other with complementary exponential weights while the two gain laws
//! move in opposite directions, so the timbre morphs instead of stepping.

use std::sync::Arc;

use crate::engine::dsp::curves::{crossfade_weights, map};
use crate::engine::dsp::filter::{Biquad, BiquadCoeffs};
use crate::engine::effects::Engine;
use crate::engine::params::{hash_path, ParamDef, ParamStore};
use crate::engine::spec::{check_block, EngineError, ProcessSpec};

pub const FILTER_BANK_PARAMS: [ParamDef; 1] =
  [ParamDef::new("filter/gain", 0.0, 10.0, 5.0, "")];

const KEY_GAIN: u64 = hash_path("filter/gain");

// Fixed voicing of the two paths.
const SHELF_FREQ_HZ: f32 = 3200.0;
const SHELF_Q: f32 = 0.7;
const PEAK_FREQ_HZ: f32 = 800.0;
const PEAK_Q: f32 = 1.0;

/// Opposed gain laws: the shelf cuts as the control rises while the peak
/// boosts, compounding the crossfade between the paths.
fn path_gains_db(x: f32) -> (f32, f32) {
  let shelf_db = map(x, 0.0, 10.0, 6.0, -6.0);
  let peak_db = map(x, 0.0, 10.0, -6.0, 6.0);
  (shelf_db, peak_db)
}

struct BankState {
  spec: ProcessSpec,
  shelf: Vec<Biquad>,
  peak: Vec<Biquad>,
  shelf_buf: Vec<Vec<f32>>,
  peak_buf: Vec<Vec<f32>>,
}

pub struct FilterBank {
  params: Arc<ParamStore>,
  state: Option<BankState>,
}

impl FilterBank {
  pub fn new() -> Self {
    Self {
      params: Arc::new(ParamStore::new(&FILTER_BANK_PARAMS)),
      state: None,
    }
  }
}

impl Default for FilterBank {
  fn default() -> Self {
    Self::new()
  }
}

impl Engine for FilterBank {
  fn prepare(&mut self, spec: ProcessSpec) -> Result<(), EngineError> {
    self.state = None;
    spec.validate()?;
    let ch = spec.num_channels;
    log::debug!(
      "filter bank: prepared at {} Hz, {} ch, blocks up to {}",
      spec.sample_rate,
      ch,
      spec.max_block_frames
    );
    self.state = Some(BankState {
      spec,
      shelf: (0..ch).map(|_| Biquad::new()).collect(),
      peak: (0..ch).map(|_| Biquad::new()).collect(),
      shelf_buf: (0..ch).map(|_| vec![0.0; spec.max_block_frames]).collect(),
      peak_buf: (0..ch).map(|_| vec![0.0; spec.max_block_frames]).collect(),
    });
    Ok(())
  }

  fn reset(&mut self) {
    self.state = None;
  }

  fn process(&mut self, block: &mut [&mut [f32]]) -> Result<(), EngineError> {
    let st = self.state.as_mut().ok_or(EngineError::NotConfigured)?;
    let frames = check_block(&st.spec, block)?;
    if frames == 0 {
      return Ok(());
    }

    let x = self.params.get_h(KEY_GAIN, 5.0).clamp(0.0, 10.0);
    let (weight_a, weight_b) = crossfade_weights(x);
    let (shelf_db, peak_db) = path_gains_db(x);
    let sr = st.spec.sample_rate as f32;
    let shelf_c = BiquadCoeffs::high_shelf(sr, SHELF_FREQ_HZ, SHELF_Q, shelf_db);
    let peak_c = BiquadCoeffs::peaking(sr, PEAK_FREQ_HZ, PEAK_Q, peak_db);

    for ch in 0..st.spec.num_channels {
      st.shelf[ch].set_coefficients(shelf_c);
      st.peak[ch].set_coefficients(peak_c);
      st.shelf[ch].process_into(&block[ch][..frames], &mut st.shelf_buf[ch][..frames]);
      st.peak[ch].process_into(&block[ch][..frames], &mut st.peak_buf[ch][..frames]);
      let out = &mut *block[ch];
      for i in 0..frames {
        out[i] = weight_a * st.shelf_buf[ch][i] + weight_b * st.peak_buf[ch][i];
      }
    }
    Ok(())
  }

  fn params(&self) -> &Arc<ParamStore> {
    &self.params
  }
}
