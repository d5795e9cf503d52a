use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;
use crate::rotor::Rotor;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// A complete rotor machine
///
/// Slot 0 of the active stack holds the reflector, the next
/// `num_rotors - pawls - 1` slots hold fixed rotors and the rightmost
/// `pawls` slots hold moving rotors.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    catalog: Vec<Rotor>,
    rotors: Vec<Rotor>,
    plugboard: Permutation,
}

impl Machine {
    /// A machine with `num_rotors > 1` slots and `pawls < num_rotors` pawls,
    /// able to use any rotor of `catalog`
    pub fn new(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        catalog: Vec<Rotor>,
    ) -> Result<Self> {
        if num_rotors < 2 {
            return Err(EnigmaError::StructuralMismatch(format!(
                "a machine needs at least 2 rotor slots, got {}",
                num_rotors
            )));
        }
        if pawls >= num_rotors {
            return Err(EnigmaError::StructuralMismatch(format!(
                "{} pawls do not fit {} rotor slots",
                pawls, num_rotors
            )));
        }

        let mut names = HashSet::with_capacity(catalog.len());
        for rotor in catalog.iter() {
            if !names.insert(rotor.name()) {
                return Err(EnigmaError::InvalidConfig(format!(
                    "rotor {} is described more than once",
                    rotor.name()
                )));
            }
            if rotor.size() != alphabet.size() {
                return Err(EnigmaError::AlphabetMismatch {
                    expected: alphabet.size(),
                    found: rotor.size(),
                });
            }
        }

        let plugboard = Permutation::identity(alphabet.clone());
        Ok(Self {
            alphabet,
            num_rotors,
            pawls,
            catalog,
            rotors: Vec::new(),
            plugboard,
        })
    }

    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Every rotor available to `insert_rotors`
    pub fn catalog(&self) -> &[Rotor] {
        &self.catalog
    }

    /// The active stack, reflector first; empty until `insert_rotors`
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Current window positions of the non-reflector slots, left to right
    pub fn positions(&self) -> String {
        self.rotors
            .iter()
            .skip(1)
            .filter_map(|r| r.alphabet().to_char(r.setting()).ok())
            .collect()
    }

    /// Fill the slots with the catalog rotors named by `names` (reflector first)
    /// Every inserted rotor starts at setting 0 with ring 0. The previous
    /// stack is kept if validation fails.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::StructuralMismatch(format!(
                "{} rotors named for {} slots",
                names.len(),
                self.num_rotors
            )));
        }

        let mut seen = HashSet::new();
        let mut stack = Vec::with_capacity(self.num_rotors);
        for name in names {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(EnigmaError::DuplicateRotor(name.to_string()));
            }
            let rotor = self
                .catalog
                .iter()
                .find(|r| r.name() == name)
                .ok_or_else(|| EnigmaError::UnknownRotor(name.to_string()))?;
            stack.push(rotor.clone());
        }

        if !stack[0].reflecting() {
            return Err(EnigmaError::MissingReflector(stack[0].name().to_string()));
        }

        let first_moving = self.num_rotors - self.pawls;
        let mut num_fixed = 0;
        for (slot, rotor) in stack.iter().enumerate().skip(1) {
            if rotor.reflecting() {
                return Err(EnigmaError::StructuralMismatch(format!(
                    "reflector {} can only be used in the first slot",
                    rotor.name()
                )));
            }
            if slot < first_moving {
                if rotor.rotates() {
                    return Err(EnigmaError::StructuralMismatch(format!(
                        "moving rotor {} placed in fixed slot {}",
                        rotor.name(),
                        slot
                    )));
                }
                num_fixed += 1;
            } else if !rotor.rotates() {
                return Err(EnigmaError::StructuralMismatch(format!(
                    "fixed rotor {} placed in moving slot {}",
                    rotor.name(),
                    slot
                )));
            }
        }
        if num_fixed != self.num_rotors - self.pawls - 1 {
            return Err(EnigmaError::StructuralMismatch(format!(
                "expected {} fixed rotors, found {}",
                self.num_rotors - self.pawls - 1,
                num_fixed
            )));
        }

        self.rotors = stack;
        let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        debug!(rotors = ?names, "inserted rotors");
        Ok(())
    }

    /// Set the window positions from `setting`, one character per
    /// non-reflector slot, leftmost first
    pub fn set_rotors(&mut self, setting: &str) -> Result<()> {
        let indices = self.slot_indices(setting)?;
        for (rotor, index) in self.rotors.iter_mut().skip(1).zip(indices) {
            rotor.set(index)?;
        }
        Ok(())
    }

    /// Set the ring settings from `rings`, one character per non-reflector slot
    pub fn set_rings(&mut self, rings: &str) -> Result<()> {
        let indices = self.slot_indices(rings)?;
        for (rotor, index) in self.rotors.iter_mut().skip(1).zip(indices) {
            rotor.set_ring(index)?;
        }
        Ok(())
    }

    /// Resolve one character per non-reflector slot through that slot's alphabet
    fn slot_indices(&self, text: &str) -> Result<Vec<usize>> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::NotConfigured);
        }
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != self.num_rotors - 1 {
            return Err(EnigmaError::InvalidSetting(format!(
                "{:?} must have exactly {} characters",
                text,
                self.num_rotors - 1
            )));
        }
        self.rotors
            .iter()
            .skip(1)
            .zip(chars)
            .map(|(rotor, ch)| rotor.alphabet().to_int(ch))
            .collect()
    }

    /// Rebind the alphabet of the rotor in `slot`
    pub fn set_alphabet(&mut self, alphabet: Arc<Alphabet>, slot: usize) -> Result<()> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::NotConfigured);
        }
        let size = self.rotors.len();
        let rotor = self.rotors.get_mut(slot).ok_or_else(|| {
            EnigmaError::InvalidSetting(format!("no rotor slot {} (machine has {})", slot, size))
        })?;
        rotor.set_alphabet(alphabet)
    }

    /// Merge the cycles of `plugboard` into the machine's plugboard
    /// Every cycle must swap exactly two characters and no character may be
    /// plugged twice; on failure the plugboard is unchanged.
    pub fn set_plugboard(&mut self, plugboard: &Permutation) -> Result<()> {
        if plugboard.size() != self.alphabet.size() {
            return Err(EnigmaError::AlphabetMismatch {
                expected: self.alphabet.size(),
                found: plugboard.size(),
            });
        }
        if let Some(cycle) = plugboard.cycles().iter().find(|c| c.len() != 2) {
            return Err(EnigmaError::InvalidPlugboard(format!(
                "({}) does not swap a pair of characters",
                cycle.iter().collect::<String>()
            )));
        }

        let mut cycles = self.plugboard.cycles().to_vec();
        cycles.extend(plugboard.cycles().iter().cloned());
        let merged =
            Permutation::from_cycles(cycles, self.alphabet.clone()).map_err(|e| match e {
                EnigmaError::MalformedCycle(msg) => EnigmaError::InvalidPlugboard(msg),
                other => other,
            })?;

        self.plugboard = merged;
        Ok(())
    }

    /// Remove every plug
    pub fn clear_plugboard(&mut self) {
        self.plugboard = Permutation::identity(self.alphabet.clone());
    }

    /// Step the rotating rotors for one key press
    ///
    /// Which rotors move is decided from the notch positions before any of
    /// them moves: the rightmost rotor always steps, a rotor steps when its
    /// right neighbour is at a notch, and a rotor at its own notch steps
    /// again when the rotor on its left is driven by a pawl (double step).
    fn advance_rotors(&mut self) {
        let n = self.rotors.len();
        let notched: Vec<bool> = self.rotors.iter().map(Rotor::at_notch).collect();
        let stepping: Vec<bool> = (0..n)
            .map(|i| {
                if !self.rotors[i].rotates() {
                    return false;
                }
                if i == n - 1 {
                    return true;
                }
                notched[i + 1] || (notched[i] && self.rotors[i - 1].rotates())
            })
            .collect();

        for (rotor, step) in self.rotors.iter_mut().zip(stepping) {
            if step {
                rotor.advance();
            }
        }
        trace!(positions = %self.positions(), "advanced rotors");
    }

    /// Advance the machine, then return the encoding of the index `c`
    /// Fails with `NotConfigured` until rotors have been inserted.
    pub fn convert(&mut self, c: usize) -> Result<usize> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::NotConfigured);
        }
        self.advance_rotors();

        let mut result = self.plugboard.permute(c);
        for rotor in self.rotors.iter().skip(1).rev() {
            result = rotor.convert_forward(result);
        }
        result = self.rotors[0].convert_forward(result);
        for rotor in self.rotors.iter().skip(1) {
            result = rotor.convert_backward(result);
        }
        Ok(self.plugboard.permute(result))
    }

    /// Encode a single character of the machine's alphabet
    pub fn convert_char(&mut self, ch: char) -> Result<char> {
        let index = self.alphabet.to_int(ch)?;
        let converted = self.convert(index)?;
        self.alphabet.to_char(converted)
    }

    /// Encode `msg`, carrying rotor state from one character to the next
    /// The machine does not step at all if `msg` holds a character outside
    /// the alphabet.
    pub fn convert_str(&mut self, msg: &str) -> Result<String> {
        if self.rotors.is_empty() {
            return Err(EnigmaError::NotConfigured);
        }
        let indices = msg
            .chars()
            .map(|c| self.alphabet.to_int(c))
            .collect::<Result<Vec<usize>>>()?;

        indices
            .into_iter()
            .map(|i| {
                let converted = self.convert(i)?;
                self.alphabet.to_char(converted)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFLECTOR_B: &str = "(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)";
    const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const ROTOR_II: &str = "(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)";
    const ROTOR_III: &str = "(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)";
    const BETA: &str = "(ALBEVFCYODJWUGNMQTZSKPR) (HIX)";

    fn catalog(alpha: &Arc<Alphabet>) -> Vec<Rotor> {
        let perm = |c: &str| Permutation::new(c, alpha.clone()).unwrap();
        vec![
            Rotor::reflector("B", perm(REFLECTOR_B)).unwrap(),
            Rotor::fixed("Beta", perm(BETA)),
            Rotor::moving("I", perm(ROTOR_I), "Q").unwrap(),
            Rotor::moving("II", perm(ROTOR_II), "E").unwrap(),
            Rotor::moving("III", perm(ROTOR_III), "V").unwrap(),
        ]
    }

    fn machine(num_rotors: usize, pawls: usize) -> Machine {
        let alpha = Arc::new(Alphabet::default());
        Machine::new(alpha.clone(), num_rotors, pawls, catalog(&alpha)).unwrap()
    }

    fn three_rotor(setting: &str) -> Machine {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors(setting).unwrap();
        m
    }

    #[test]
    fn test_new_validates_counts() {
        let alpha = Arc::new(Alphabet::default());
        assert!(matches!(
            Machine::new(alpha.clone(), 1, 0, catalog(&alpha)),
            Err(EnigmaError::StructuralMismatch(_))
        ));
        assert!(matches!(
            Machine::new(alpha.clone(), 4, 4, catalog(&alpha)),
            Err(EnigmaError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_catalog_names() {
        let alpha = Arc::new(Alphabet::default());
        let mut rotors = catalog(&alpha);
        rotors.push(rotors[2].clone());
        assert!(matches!(
            Machine::new(alpha, 4, 3, rotors),
            Err(EnigmaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_historical_vector() {
        let mut m = three_rotor("AAA");
        assert_eq!(m.convert_str("AAAAA").unwrap(), "BDZGO");
        assert_eq!(m.positions(), "AAF");
    }

    #[test]
    fn test_single_step() {
        let mut m = three_rotor("AAA");
        m.convert(0).unwrap();
        assert_eq!(m.positions(), "AAB");
    }

    #[test]
    fn test_double_step() {
        let mut m = three_rotor("ADU");
        m.convert(0).unwrap();
        assert_eq!(m.positions(), "ADV");
        m.convert(0).unwrap();
        // right rotor leaves its notch: middle steps onto its own notch
        assert_eq!(m.positions(), "AEW");
        m.convert(0).unwrap();
        // middle rotor steps again and drags the left rotor along
        assert_eq!(m.positions(), "BFX");
        m.convert(0).unwrap();
        assert_eq!(m.positions(), "BFY");
    }

    #[test]
    fn test_left_rotor_notch_has_no_effect() {
        let mut m = three_rotor("QAA");
        m.convert(0).unwrap();
        assert_eq!(m.positions(), "QAB");
    }

    #[test]
    fn test_fixed_rotor_never_steps() {
        let mut m = machine(5, 3);
        m.insert_rotors(&["B", "Beta", "I", "II", "III"]).unwrap();
        m.set_rotors("AQEV").unwrap();
        m.convert(0).unwrap();
        assert_eq!(m.positions(), "ARFW");
    }

    #[test]
    fn test_self_reciprocal() {
        let mut m = three_rotor("MCK");
        let msg = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG";
        let cipher = m.convert_str(msg).unwrap();
        assert_ne!(cipher, msg);

        let mut m = three_rotor("MCK");
        assert_eq!(m.convert_str(&cipher).unwrap(), msg);
    }

    #[test]
    fn test_no_letter_encodes_to_itself() {
        let mut m = three_rotor("AAA");
        for ch in "ABCDEFGHIJKLMNOPQRSTUVWXYZ".chars().cycle().take(200) {
            assert_ne!(m.convert_char(ch).unwrap(), ch);
        }
    }

    #[test]
    fn test_plugboard_symmetry() {
        let mut plugged = three_rotor("AAA");
        let alpha = plugged.alphabet().clone();
        plugged
            .set_plugboard(&Permutation::new("(AB)", alpha).unwrap())
            .unwrap();
        let mut plain = three_rotor("AAA");

        // Entering at A follows the unplugged path of B and vice versa
        let from_a = plugged.convert(0).unwrap();
        let from_b = plain.convert(1).unwrap();
        let swap = |i: usize| match i {
            0 => 1,
            1 => 0,
            other => other,
        };
        assert_eq!(from_a, swap(from_b));
    }

    #[test]
    fn test_plugboard_accumulates_pairs() {
        let mut m = three_rotor("AAA");
        let alpha = m.alphabet().clone();
        m.set_plugboard(&Permutation::new("(AB)", alpha.clone()).unwrap())
            .unwrap();
        m.set_plugboard(&Permutation::new("(CD) (EF)", alpha).unwrap())
            .unwrap();
        assert_eq!(m.plugboard().moved(), 6);
        assert_eq!(m.plugboard().to_string(), "(AB) (CD) (EF)");

        m.clear_plugboard();
        assert_eq!(m.plugboard().moved(), 0);
    }

    #[test]
    fn test_plugboard_rejects_long_cycles() {
        let mut m = three_rotor("AAA");
        let alpha = m.alphabet().clone();
        let err = m
            .set_plugboard(&Permutation::new("(ABC)", alpha).unwrap())
            .unwrap_err();
        assert!(matches!(err, EnigmaError::InvalidPlugboard(_)));
        assert_eq!(m.plugboard().moved(), 0);
    }

    #[test]
    fn test_plugboard_rejects_fixed_point() {
        let mut m = three_rotor("AAA");
        let alpha = m.alphabet().clone();
        let err = m
            .set_plugboard(&Permutation::new("(AB) (C)", alpha).unwrap())
            .unwrap_err();
        assert!(matches!(err, EnigmaError::InvalidPlugboard(_)));
        assert_eq!(m.plugboard().moved(), 0);
    }

    #[test]
    fn test_plugboard_rejects_reused_character() {
        let mut m = three_rotor("AAA");
        let alpha = m.alphabet().clone();
        m.set_plugboard(&Permutation::new("(AB)", alpha.clone()).unwrap())
            .unwrap();
        let err = m
            .set_plugboard(&Permutation::new("(BC)", alpha).unwrap())
            .unwrap_err();
        assert!(matches!(err, EnigmaError::InvalidPlugboard(_)));
        assert_eq!(m.plugboard().to_string(), "(AB)");
    }

    #[test]
    fn test_missing_reflector() {
        let mut m = machine(4, 3);
        let err = m.insert_rotors(&["I", "B", "II", "III"]).unwrap_err();
        assert!(matches!(err, EnigmaError::MissingReflector(name) if name == "I"));
        assert!(m.rotors().is_empty());
        assert!(matches!(m.convert_str("A"), Err(EnigmaError::NotConfigured)));
    }

    #[test]
    fn test_convert_requires_rotors() {
        let mut m = machine(4, 3);
        assert!(matches!(m.convert(3), Err(EnigmaError::NotConfigured)));
        assert!(matches!(m.convert_char('D'), Err(EnigmaError::NotConfigured)));
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        assert_ne!(m.convert(3).unwrap(), 3);
    }

    #[test]
    fn test_unknown_rotor() {
        let mut m = machine(4, 3);
        let err = m.insert_rotors(&["B", "I", "II", "IX"]).unwrap_err();
        assert!(matches!(err, EnigmaError::UnknownRotor(name) if name == "IX"));
    }

    #[test]
    fn test_duplicate_rotor() {
        let mut m = machine(4, 3);
        let err = m.insert_rotors(&["B", "I", "I", "III"]).unwrap_err();
        assert!(matches!(err, EnigmaError::DuplicateRotor(_)));
    }

    #[test]
    fn test_structural_mismatch() {
        let mut m = machine(5, 3);
        // moving rotor in the fixed slot
        assert!(matches!(
            m.insert_rotors(&["B", "I", "Beta", "II", "III"]),
            Err(EnigmaError::StructuralMismatch(_))
        ));
        // wrong number of names
        assert!(matches!(
            m.insert_rotors(&["B", "Beta", "I", "II"]),
            Err(EnigmaError::StructuralMismatch(_))
        ));
        // too many moving rotors for the pawls
        let mut m = machine(5, 2);
        assert!(matches!(
            m.insert_rotors(&["B", "I", "Beta", "II", "III"]),
            Err(EnigmaError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_failed_insert_keeps_previous_stack() {
        let mut m = three_rotor("ABC");
        assert!(m.insert_rotors(&["III", "B", "I", "II"]).is_err());
        assert_eq!(m.rotors()[1].name(), "I");
        assert_eq!(m.positions(), "ABC");
    }

    #[test]
    fn test_set_rotors_validates_length() {
        let mut m = machine(4, 3);
        assert!(matches!(m.set_rotors("AAA"), Err(EnigmaError::NotConfigured)));
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        assert!(matches!(m.set_rotors("AA"), Err(EnigmaError::InvalidSetting(_))));
        assert!(matches!(m.set_rotors("AAAA"), Err(EnigmaError::InvalidSetting(_))));
        assert!(matches!(m.set_rotors("AaA"), Err(EnigmaError::InvalidCharacter('a'))));
    }

    #[test]
    fn test_ring_settings() {
        let mut m = three_rotor("AAA");
        m.set_rings("BBB").unwrap();
        assert_eq!(m.convert_str("AAAAA").unwrap(), "EWTYX");
    }

    #[test]
    fn test_convert_str_rejects_foreign_characters_without_stepping() {
        let mut m = three_rotor("AAA");
        assert!(matches!(
            m.convert_str("AB1"),
            Err(EnigmaError::InvalidCharacter('1'))
        ));
        assert_eq!(m.positions(), "AAA");
    }

    #[test]
    fn test_set_alphabet_on_slot() {
        let mut m = three_rotor("AAA");
        let rotated = Arc::new(Alphabet::new("BCDEFGHIJKLMNOPQRSTUVWXYZA").unwrap());
        m.set_alphabet(rotated, 3).unwrap();
        assert_eq!(m.rotors()[3].alphabet().to_char(0).unwrap(), 'B');
        assert!(matches!(
            m.set_alphabet(Arc::new(Alphabet::default()), 9),
            Err(EnigmaError::InvalidSetting(_))
        ));
    }
}
