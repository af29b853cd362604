//! Tape saturation with age-dependent wow/flutter.
//!
//! Signal path per channel: capture dry, upsample 2x, tanh saturation with a
//! progressive drive curve, decimate back, then a slowly modulated delay that
//! mimics the pitch instability of worn transport hardware. The dry copy is
//! blended back in at the end.

use std::f32::consts::TAU;
use std::sync::Arc;

use crate::engine::dsp::curves::drive_to_gain;
use crate::engine::dsp::delay_line::DelayLine;
use crate::engine::dsp::drywet::DryWetMixer;
use crate::engine::dsp::oversample::Oversampler;
use crate::engine::dsp::shaper::saturate_block;
use crate::engine::effects::Engine;
use crate::engine::params::{hash_path, ParamDef, ParamStore};
use crate::engine::spec::{check_block, EngineError, ProcessSpec};

// ─── Parameters ───

pub const TAPE_PARAMS: [ParamDef; 3] = [
  ParamDef::new("tape/drive", 0.0, 1.0, 0.5, ""),
  ParamDef::new("tape/age", 0.0, 1.0, 0.25, ""),
  ParamDef::new("tape/mix", 0.0, 1.0, 1.0, ""),
];

const KEY_DRIVE: u64 = hash_path("tape/drive");
const KEY_AGE: u64 = hash_path("tape/age");
const KEY_MIX: u64 = hash_path("tape/mix");

// ─── Wow/flutter constants ───

/// Center of the modulated delay.
const BASE_DELAY_S: f32 = 0.1;
/// Delay buffer length; leaves headroom for the modulation excursion.
const MAX_DELAY_S: f32 = 0.2;
/// Peak pitch deviation at full age, as a delay ratio. 2^(10/1200) - 1 is
/// ten cents.
const MAX_DEPTH_RATIO: f32 = 0.005_792_9;

const OVERSAMPLE_FACTOR: usize = 2;

// ─── Wow/flutter ───

/// Slow sinusoidal delay modulation. Each channel runs its own LFO phase,
/// seeded with a fixed per-channel offset so stereo material decorrelates
/// while the whole engine stays deterministic.
struct WowFlutter {
  delay: DelayLine,
  phases: Vec<f32>,
  base_delay_samples: f32,
  sample_rate: f32,
}

impl WowFlutter {
  fn new(sample_rate: f32, num_channels: usize) -> Self {
    let capacity = (MAX_DELAY_S * sample_rate).ceil() as usize;
    Self {
      delay: DelayLine::new(num_channels, capacity),
      phases: (0..num_channels).map(|ch| 0.33 * TAU * ch as f32).collect(),
      base_delay_samples: BASE_DELAY_S * sample_rate,
      sample_rate,
    }
  }

  /// Run one channel of the block through the modulated delay. `age` in
  /// [0, 1] scales both LFO rate (1..2 Hz) and depth (0..10 cents).
  fn process_channel(&mut self, channel: usize, buf: &mut [f32], age: f32) {
    let depth = age * MAX_DEPTH_RATIO;
    let lfo_hz = 1.0 + age;
    let inc = TAU * lfo_hz / self.sample_rate;
    let mut phase = self.phases[channel];
    for s in buf.iter_mut() {
      self.delay.push(channel, *s);
      let delay = self.base_delay_samples * (1.0 + depth * phase.sin());
      *s = self.delay.pop(channel, delay);
      phase += inc;
      if phase >= TAU {
        phase -= TAU;
      }
    }
    self.phases[channel] = phase;
  }
}

// ─── Engine ───

struct TapeState {
  spec: ProcessSpec,
  oversampler: Oversampler,
  flutter: WowFlutter,
  mixer: DryWetMixer,
}

pub struct TapeAge {
  params: Arc<ParamStore>,
  state: Option<TapeState>,
}

impl TapeAge {
  pub fn new() -> Self {
    Self {
      params: Arc::new(ParamStore::new(&TAPE_PARAMS)),
      state: None,
    }
  }
}

impl Default for TapeAge {
  fn default() -> Self {
    Self::new()
  }
}

impl Engine for TapeAge {
  fn prepare(&mut self, spec: ProcessSpec) -> Result<(), EngineError> {
    self.state = None;
    spec.validate()?;
    let oversampler =
      Oversampler::new(OVERSAMPLE_FACTOR, spec.num_channels, spec.max_block_frames)?;
    let flutter = WowFlutter::new(spec.sample_rate as f32, spec.num_channels);
    let mixer = DryWetMixer::new(spec.num_channels, spec.max_block_frames);
    log::debug!(
      "tape: prepared at {} Hz, {} ch, blocks up to {}",
      spec.sample_rate,
      spec.num_channels,
      spec.max_block_frames
    );
    self.state = Some(TapeState { spec, oversampler, flutter, mixer });
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

    // one snapshot per block; the control thread may race, the block sees
    // a single consistent value
    let drive = self.params.get_h(KEY_DRIVE, 0.5).clamp(0.0, 1.0);
    let age = self.params.get_h(KEY_AGE, 0.25).clamp(0.0, 1.0);
    let mix = self.params.get_h(KEY_MIX, 1.0).clamp(0.0, 1.0);
    let gain = drive_to_gain(drive);

    st.mixer.push_dry(block);
    for ch in 0..st.spec.num_channels {
      let buf = &mut *block[ch];
      let os = st.oversampler.upsample(ch, buf)?;
      saturate_block(os, gain);
      st.oversampler.downsample(ch, buf)?;
      st.flutter.process_channel(ch, buf, age);
    }
    st.mixer.mix_wet(block, mix);
    Ok(())
  }

  fn params(&self) -> &Arc<ParamStore> {
    &self.params
  }

  fn latency_frames(&self) -> usize {
    match &self.state {
      Some(st) => {
        let delay = (BASE_DELAY_S * st.spec.sample_rate as f32) as usize;
        delay + st.oversampler.latency_frames()
      }
      None => 0,
    }
  }
}
