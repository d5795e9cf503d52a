//! Machine configuration files
//!
//! A configuration is a sequence of whitespace separated tokens:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ 5 3
//! I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!     (RX) (SZ) (TV)
//! ```
//!
//! The alphabet comes first, then the number of rotor slots and the number
//! of pawls, then one description per available rotor: its name, its type
//! (`R` reflector, `N` fixed, `M` followed by the notch characters for a
//! moving rotor) and its cycles. Every following token that starts with `(`
//! belongs to the rotor, so cycles may continue on the next line.

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;
use std::iter::Peekable;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Read a configuration file from disk
pub fn load_config(path: &Path) -> Result<Machine> {
    let text = std::fs::read_to_string(path)?;
    let machine = read_config(&text)?;
    debug!(path = %path.display(), rotors = machine.catalog().len(), "loaded configuration");
    Ok(machine)
}

/// Build a machine from the text of a configuration
pub fn read_config(text: &str) -> Result<Machine> {
    let mut tokens = text.split_whitespace().peekable();

    let alphabet = tokens
        .next()
        .ok_or_else(|| EnigmaError::TruncatedConfig("missing alphabet".into()))?;
    if alphabet.contains(['(', ')']) {
        return Err(EnigmaError::InvalidConfig(format!(
            "alphabet {} cannot contain parentheses",
            alphabet
        )));
    }
    let alphabet = Arc::new(Alphabet::new(alphabet)?);
    let num_rotors = next_count(&mut tokens, "number of rotor slots")?;
    let pawls = next_count(&mut tokens, "number of pawls")?;

    let mut catalog = Vec::new();
    while tokens.peek().is_some() {
        catalog.push(read_rotor(&mut tokens, &alphabet)?);
    }

    Machine::new(alphabet, num_rotors, pawls, catalog)
}

fn next_count<'a, I>(tokens: &mut I, what: &str) -> Result<usize>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or_else(|| EnigmaError::TruncatedConfig(format!("missing {}", what)))?;
    token.parse().map_err(|_| {
        EnigmaError::InvalidConfig(format!("{} must be a non-negative integer, found {}", what, token))
    })
}

/// Read one rotor description: name, type, then every cycle token
fn read_rotor<'a, I>(tokens: &mut Peekable<I>, alphabet: &Arc<Alphabet>) -> Result<Rotor>
where
    I: Iterator<Item = &'a str>,
{
    let name = tokens
        .next()
        .ok_or_else(|| EnigmaError::TruncatedConfig("missing rotor name".into()))?;
    if name.contains(['(', ')']) {
        return Err(EnigmaError::MalformedCycle(format!(
            "{} is not part of a rotor description",
            name
        )));
    }
    let kind = tokens.next().ok_or_else(|| {
        EnigmaError::TruncatedConfig(format!("bad rotor description: {} has no type", name))
    })?;

    let mut cycles = Vec::new();
    while let Some(token) = tokens.next_if(|t| t.starts_with('(')) {
        cycles.push(token);
    }
    let permutation = Permutation::new(&cycles.join(" "), alphabet.clone())?;

    let mut type_chars = kind.chars();
    match type_chars.next() {
        Some('R') if kind.len() == 1 => Rotor::reflector(name, permutation),
        Some('N') if kind.len() == 1 => Ok(Rotor::fixed(name, permutation)),
        Some('M') => Rotor::moving(name, permutation, type_chars.as_str()),
        _ => Err(EnigmaError::InvalidConfig(format!(
            "rotor {} has unknown type {}",
            name, kind
        ))),
    }
}
