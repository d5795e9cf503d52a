use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;
use std::sync::Arc;

/// What a rotor is able to do inside the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Non-moving, terminates the signal path; always at position 0
    Reflector,
    /// Non-moving; its setting is chosen once and never stepped
    Fixed,
    /// Driven by a pawl; steps the rotor on its left when at one of its notches
    Moving { notches: Vec<char> },
}

/// A rotor: a permutation seen through a rotating frame of reference
///
/// `setting` is the position shown in the window and `ring` the ring
/// setting (Ringstellung). The wiring is offset by `setting - ring`; the
/// notches are attached to the lettered ring and so follow `setting` only.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    kind: RotorKind,
    permutation: Permutation,
    setting: usize,
    ring: usize,
}

impl Rotor {
    /// A reflector; `permutation` must pair every character with another
    pub fn reflector(name: impl Into<String>, permutation: Permutation) -> Result<Self> {
        let name = name.into();
        if !permutation.derangement() || !permutation.is_involution() {
            return Err(EnigmaError::InvalidReflector(name));
        }
        Ok(Self::with_kind(name, RotorKind::Reflector, permutation))
    }

    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Self::with_kind(name.into(), RotorKind::Fixed, permutation)
    }

    /// A moving rotor whose notches are the characters of `notches`
    pub fn moving(name: impl Into<String>, permutation: Permutation, notches: &str) -> Result<Self> {
        let notches: Vec<char> = notches.chars().collect();
        if let Some(&bad) = notches.iter().find(|&&c| !permutation.alphabet().contains(c)) {
            return Err(EnigmaError::InvalidCharacter(bad));
        }
        Ok(Self::with_kind(name.into(), RotorKind::Moving { notches }, permutation))
    }

    fn with_kind(name: String, kind: RotorKind, permutation: Permutation) -> Self {
        Self {
            name,
            kind,
            permutation,
            setting: 0,
            ring: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    pub fn notches(&self) -> &[char] {
        match &self.kind {
            RotorKind::Moving { notches } => notches.as_slice(),
            _ => &[],
        }
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    pub fn setting(&self) -> usize {
        self.setting
    }

    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Set the window position to `position` (modulo the alphabet size)
    pub fn set(&mut self, position: usize) -> Result<()> {
        if self.reflecting() && position != 0 {
            return Err(EnigmaError::IllegalReflectorPosition(position));
        }
        self.setting = position % self.size();
        Ok(())
    }

    /// Set the window position to the character `position`
    pub fn set_char(&mut self, position: char) -> Result<()> {
        let index = self.alphabet().to_int(position)?;
        self.set(index)
    }

    /// Set the ring setting; a reflector only accepts 0
    pub fn set_ring(&mut self, ring: usize) -> Result<()> {
        if self.reflecting() && ring != 0 {
            return Err(EnigmaError::IllegalReflectorPosition(ring));
        }
        self.ring = ring % self.size();
        Ok(())
    }

    pub fn set_ring_char(&mut self, ring: char) -> Result<()> {
        let index = self.alphabet().to_int(ring)?;
        self.set_ring(index)
    }

    /// Rebind the alphabet the wiring is expressed in
    pub fn set_alphabet(&mut self, alphabet: Arc<Alphabet>) -> Result<()> {
        self.permutation.change_alphabet(alphabet)
    }

    fn offset(&self) -> i64 {
        self.setting as i64 - self.ring as i64
    }

    /// Convert the contact index `p` entering from the right
    pub fn convert_forward(&self, p: usize) -> usize {
        let k = self.offset();
        let perm = &self.permutation;
        perm.wrap(perm.permute(perm.wrap(p as i64 + k)) as i64 - k)
    }

    /// Convert the contact index `e` entering from the left
    pub fn convert_backward(&self, e: usize) -> usize {
        let k = self.offset();
        let perm = &self.permutation;
        perm.wrap(perm.invert(perm.wrap(e as i64 + k)) as i64 - k)
    }

    /// Step one position; only moving rotors advance
    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    /// True iff the rotor is moving and its window shows one of its notches
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => self
                .alphabet()
                .to_char(self.setting)
                .map(|c| notches.contains(&c))
                .unwrap_or(false),
            _ => false,
        }
    }
}
