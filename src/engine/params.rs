use std::sync::atomic::{AtomicU32, Ordering};

/// Static description of one control: path, numeric range, default and unit.
/// The ranges documented here are contractual for the external parameter
/// editor; the store clamps writes into range and engines clamp again on read
/// as a defensive backstop.
#[derive(Clone, Copy, Debug)]
pub struct ParamDef {
  pub path: &'static str,
  pub min: f32,
  pub max: f32,
  pub default: f32,
  pub unit: &'static str,
}

impl ParamDef {
  pub const fn new(path: &'static str, min: f32, max: f32, default: f32, unit: &'static str) -> Self {
    Self { path, min, max, default, unit }
  }
}

struct Slot {
  def: ParamDef,
  hash: u64,
  bits: AtomicU32,
}

/// Lock-free parameter store shared between a control thread and the
/// processing thread. Values live as f32 bit patterns in single-word atomics,
/// so a concurrent writer can never leave the reader observing a torn value
/// and neither side ever blocks. The processing thread snapshots each value
/// with one relaxed load at the top of a block.
pub struct ParamStore {
  slots: Vec<Slot>,
}

impl ParamStore {
  pub fn new(defs: &[ParamDef]) -> Self {
    let slots = defs
      .iter()
      .map(|d| Slot { def: *d, hash: hash_path(d.path), bits: AtomicU32::new(d.default.to_bits()) })
      .collect();
    Self { slots }
  }

  /// Store a value, clamped into the declared range. Unknown paths are
  /// ignored; returns whether the path matched a slot.
  pub fn set(&self, path: &str, v: f32) -> bool {
    let h = hash_path(path);
    for s in &self.slots {
      if s.hash == h {
        let clamped = v.clamp(s.def.min, s.def.max);
        s.bits.store(clamped.to_bits(), Ordering::Relaxed);
        return true;
      }
    }
    false
  }

  /// Atomic load by precomputed path hash.
  #[inline]
  pub fn get_h(&self, key: u64, default: f32) -> f32 {
    for s in &self.slots {
      if s.hash == key {
        return f32::from_bits(s.bits.load(Ordering::Relaxed));
      }
    }
    default
  }

  pub fn get(&self, path: &str, default: f32) -> f32 {
    self.get_h(hash_path(path), default)
  }

  /// The declared controls, in registration order.
  pub fn defs(&self) -> impl Iterator<Item = &ParamDef> {
    self.slots.iter().map(|s| &s.def)
  }

  /// Restore every control to its declared default.
  pub fn reset_to_defaults(&self) {
    for s in &self.slots {
      s.bits.store(s.def.default.to_bits(), Ordering::Relaxed);
    }
  }
}

/// FNV-1a 64-bit; const so engines can hash their keys at compile time.
pub const fn hash_path(path: &str) -> u64 {
  let bytes = path.as_bytes();
  let mut hash: u64 = 0xcbf29ce484222325; // offset basis
  let mut i = 0;
  while i < bytes.len() {
    hash ^= bytes[i] as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    i += 1;
  }
  hash
}

#[cfg(test)]
mod tests {
  use super::*;

  const DEFS: [ParamDef; 2] = [
    ParamDef::new("drive", 0.0, 1.0, 0.5, ""),
    ParamDef::new("decay", 0.1, 10.0, 2.5, "s"),
  ];

  #[test]
  fn starts_at_defaults() {
    let store = ParamStore::new(&DEFS);
    assert_eq!(store.get("drive", -1.0), 0.5);
    assert_eq!(store.get("decay", -1.0), 2.5);
  }

  #[test]
  fn set_then_get_roundtrip() {
    let store = ParamStore::new(&DEFS);
    assert!(store.set("drive", 0.8));
    assert_eq!(store.get("drive", 0.0), 0.8);
    assert_eq!(store.get_h(hash_path("drive"), 0.0), 0.8);
  }

  #[test]
  fn set_clamps_to_declared_range() {
    let store = ParamStore::new(&DEFS);
    store.set("drive", 7.0);
    assert_eq!(store.get("drive", 0.0), 1.0);
    store.set("decay", -3.0);
    assert_eq!(store.get("decay", 0.0), 0.1);
  }

  #[test]
  fn unknown_path_is_ignored() {
    let store = ParamStore::new(&DEFS);
    assert!(!store.set("nope", 1.0));
    assert_eq!(store.get("nope", 42.0), 42.0);
  }

  #[test]
  fn reset_restores_defaults() {
    let store = ParamStore::new(&DEFS);
    store.set("drive", 1.0);
    store.reset_to_defaults();
    assert_eq!(store.get("drive", 0.0), 0.5);
  }

  #[test]
  fn const_hash_matches_runtime_hash() {
    const K: u64 = hash_path("drive");
    assert_eq!(K, hash_path("drive"));
    assert_ne!(hash_path("drive"), hash_path("decay"));
  }

  #[test]
  fn defaults_sit_inside_declared_ranges() {
    let store = ParamStore::new(&DEFS);
    for d in store.defs() {
      assert!(d.min <= d.default && d.default <= d.max, "{}", d.path);
    }
  }
}
