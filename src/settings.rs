use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use tracing::debug;

/// One settings line: `* <rotors> <positions> [<rings>] [<plug cycles>]`
///
/// ```text
/// * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)
/// * B Beta III IV I AXLE BBBB (YF) (ZH)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Rotor names, reflector first
    pub rotors: Vec<String>,
    /// Initial window positions of the non-reflector rotors
    pub positions: String,
    /// Ring settings of the non-reflector rotors
    pub rings: Option<String>,
    /// Plugboard cycles, each swapping two characters
    pub plugboard: Vec<String>,
}

impl Settings {
    /// True iff the first token of `line` is `*`
    pub fn is_settings_line(line: &str) -> bool {
        line.split_whitespace().next() == Some("*")
    }

    /// Parse a settings line for a machine with `num_rotors` slots
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("*") {
            return Err(EnigmaError::InvalidSetting(format!(
                "settings line must start with '*': {}",
                line
            )));
        }

        let rotors: Vec<String> = tokens.by_ref().take(num_rotors).map(String::from).collect();
        if rotors.len() != num_rotors {
            return Err(EnigmaError::InvalidSetting(format!(
                "expected {} rotor names, found {}",
                num_rotors,
                rotors.len()
            )));
        }
        let positions = tokens
            .next()
            .ok_or_else(|| EnigmaError::InvalidSetting("missing rotor positions".into()))?
            .to_string();

        let mut rings = None;
        let mut plugboard = Vec::new();
        for token in tokens {
            if token.starts_with('(') {
                plugboard.push(token.to_string());
            } else if rings.is_none() && plugboard.is_empty() {
                rings = Some(token.to_string());
            } else {
                return Err(EnigmaError::InvalidSetting(format!(
                    "unexpected token {}",
                    token
                )));
            }
        }

        Ok(Self {
            rotors,
            positions,
            rings,
            plugboard,
        })
    }

    /// Reconfigure `machine`: insert the rotors, set positions and rings,
    /// and replace the plugboard
    pub fn apply(&self, machine: &mut Machine) -> Result<()> {
        machine.insert_rotors(&self.rotors)?;
        machine.set_rotors(&self.positions)?;
        if let Some(rings) = &self.rings {
            machine.set_rings(rings)?;
        }

        machine.clear_plugboard();
        for cycle in &self.plugboard {
            let plug = Permutation::new(cycle, machine.alphabet().clone())?;
            machine.set_plugboard(&plug)?;
        }

        debug!(
            rotors = ?self.rotors,
            positions = %self.positions,
            rings = ?self.rings,
            plugboard = %machine.plugboard(),
            "applied settings"
        );
        Ok(())
    }
}
