//! Algorithmic reverb with transport-style controls.
//!
//! The reverb core runs fully wet; dry/wet blending happens outside it so
//! mix 0 is bit-exact dry regardless of what the tail is doing. Decay is
//! exposed in seconds and mapped inversely onto the core's damping.

use std::sync::Arc;

use freeverb::Freeverb;

use crate::engine::dsp::curves::decay_to_damping;
use crate::engine::dsp::drywet::DryWetMixer;
use crate::engine::effects::Engine;
use crate::engine::params::{hash_path, ParamDef, ParamStore};
use crate::engine::spec::{check_block, EngineError, ProcessSpec};

pub const REVERB_PARAMS: [ParamDef; 3] = [
  ParamDef::new("reverb/size", 0.0, 100.0, 50.0, "%"),
  ParamDef::new("reverb/decay", 0.1, 10.0, 2.5, "s"),
  ParamDef::new("reverb/mix", 0.0, 100.0, 25.0, "%"),
];

const KEY_SIZE: u64 = hash_path("reverb/size");
const KEY_DECAY: u64 = hash_path("reverb/decay");
const KEY_MIX: u64 = hash_path("reverb/mix");

struct VerbState {
  spec: ProcessSpec,
  reverb: Freeverb,
  mixer: DryWetMixer,
  // last values pushed into the core, to skip redundant retunes
  last_size: f32,
  last_damp: f32,
}

pub struct FlutterVerb {
  params: Arc<ParamStore>,
  state: Option<VerbState>,
}

impl FlutterVerb {
  pub fn new() -> Self {
    Self {
      params: Arc::new(ParamStore::new(&REVERB_PARAMS)),
      state: None,
    }
  }
}

impl Default for FlutterVerb {
  fn default() -> Self {
    Self::new()
  }
}

impl Engine for FlutterVerb {
  fn prepare(&mut self, spec: ProcessSpec) -> Result<(), EngineError> {
    self.state = None;
    spec.validate()?;
    let mut reverb = Freeverb::new(spec.sample_rate as usize);
    // the core stays fully wet; blending is ours
    reverb.set_wet(1.0);
    reverb.set_dry(0.0);
    reverb.set_width(1.0);

    let size = self.params.get_h(KEY_SIZE, 50.0).clamp(0.0, 100.0);
    let decay = self.params.get_h(KEY_DECAY, 2.5).clamp(0.1, 10.0);
    let damp = decay_to_damping(decay);
    reverb.set_room_size(f64::from(size) / 100.0);
    reverb.set_dampening(f64::from(damp));

    log::debug!(
      "reverb: prepared at {} Hz, {} ch, blocks up to {}",
      spec.sample_rate,
      spec.num_channels,
      spec.max_block_frames
    );
    self.state = Some(VerbState {
      spec,
      reverb,
      mixer: DryWetMixer::new(spec.num_channels, spec.max_block_frames),
      last_size: size,
      last_damp: damp,
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

    let size = self.params.get_h(KEY_SIZE, 50.0).clamp(0.0, 100.0);
    let decay = self.params.get_h(KEY_DECAY, 2.5).clamp(0.1, 10.0);
    let mix = self.params.get_h(KEY_MIX, 25.0).clamp(0.0, 100.0) / 100.0;

    if size != st.last_size {
      st.reverb.set_room_size(f64::from(size) / 100.0);
      st.last_size = size;
    }
    let damp = decay_to_damping(decay);
    if damp != st.last_damp {
      st.reverb.set_dampening(f64::from(damp));
      st.last_damp = damp;
    }

    st.mixer.push_dry(block);
    match &mut *block {
      [mono] => {
        for s in mono.iter_mut() {
          let x = f64::from(*s);
          let (wl, wr) = st.reverb.tick((x, x));
          *s = ((wl + wr) * 0.5) as f32;
        }
      }
      [left, right] => {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
          let (wl, wr) = st.reverb.tick((f64::from(*l), f64::from(*r)));
          *l = wl as f32;
          *r = wr as f32;
        }
      }
      _ => unreachable!("channel count validated against the spec"),
    }
    st.mixer.mix_wet(block, mix);
    Ok(())
  }

  fn params(&self) -> &Arc<ParamStore> {
    &self.params
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stereo_spec() -> ProcessSpec {
    ProcessSpec { sample_rate: 44100.0, max_block_frames: 256, num_channels: 2 }
  }

  #[test]
  fn unconfigured_process_errors() {
    let mut verb = FlutterVerb::new();
    let mut mono = [0.0f32; 8];
    let mut block: [&mut [f32]; 1] = [&mut mono];
    assert_eq!(verb.process(&mut block), Err(EngineError::NotConfigured));
  }

  #[test]
  fn silence_in_silence_out() {
    let mut verb = FlutterVerb::new();
    verb.prepare(stereo_spec()).unwrap();
    let mut l = [0.0f32; 256];
    let mut r = [0.0f32; 256];
    for _ in 0..20 {
      let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
      verb.process(&mut block).unwrap();
    }
    assert!(l.iter().chain(r.iter()).all(|&s| s == 0.0));
  }

  #[test]
  fn mix_zero_is_bit_exact_dry() {
    let mut verb = FlutterVerb::new();
    verb.prepare(stereo_spec()).unwrap();
    verb.params().set("reverb/mix", 0.0);
    let dry: Vec<f32> = (0..256).map(|i| (i as f32 * 0.23).sin() * 0.7).collect();
    let mut l = dry.clone();
    let mut r = dry.clone();
    for _ in 0..4 {
      let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
      verb.process(&mut block).unwrap();
      assert_eq!(l, dry);
      assert_eq!(r, dry);
      l.copy_from_slice(&dry);
      r.copy_from_slice(&dry);
    }
  }

  #[test]
  fn impulse_grows_a_tail() {
    let mut verb = FlutterVerb::new();
    verb.prepare(stereo_spec()).unwrap();
    verb.params().set("reverb/mix", 100.0);
    let mut l = [0.0f32; 256];
    let mut r = [0.0f32; 256];
    l[0] = 1.0;
    r[0] = 1.0;
    let mut energy_after_impulse = 0.0f32;
    for blk in 0..40 {
      {
        let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
        verb.process(&mut block).unwrap();
      }
      if blk > 4 {
        energy_after_impulse += l.iter().map(|s| s * s).sum::<f32>();
      }
      l.fill(0.0);
      r.fill(0.0);
    }
    assert!(energy_after_impulse > 0.0, "tail should outlive the impulse");
  }

  #[test]
  fn mono_blocks_are_supported() {
    let spec = ProcessSpec { sample_rate: 48000.0, max_block_frames: 128, num_channels: 1 };
    let mut verb = FlutterVerb::new();
    verb.prepare(spec).unwrap();
    verb.params().set("reverb/mix", 100.0);
    let mut mono: Vec<f32> = (0..128).map(|i| (i as f32 * 0.11).sin()).collect();
    let mut block: [&mut [f32]; 1] = [&mut mono];
    verb.process(&mut block).unwrap();
  }

  #[test]
  fn deterministic_across_instances() {
    let run = || {
      let mut verb = FlutterVerb::new();
      verb.prepare(stereo_spec()).unwrap();
      verb.params().set("reverb/mix", 60.0);
      verb.params().set("reverb/size", 80.0);
      let mut l: Vec<f32> = (0..256).map(|i| (i as f32 * 0.09).sin()).collect();
      let mut r = l.clone();
      for _ in 0..6 {
        let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
        verb.process(&mut block).unwrap();
      }
      (l, r)
    };
    assert_eq!(run(), run());
  }

  #[test]
  fn parameter_changes_mid_stream_do_not_error() {
    let mut verb = FlutterVerb::new();
    verb.prepare(stereo_spec()).unwrap();
    let mut l = [0.1f32; 256];
    let mut r = [0.1f32; 256];
    for blk in 0..10 {
      verb.params().set("reverb/size", (blk * 10) as f32);
      verb.params().set("reverb/decay", 0.1 + blk as f32);
      let mut block: [&mut [f32]; 2] = [&mut l, &mut r];
      verb.process(&mut block).unwrap();
    }
  }
}
