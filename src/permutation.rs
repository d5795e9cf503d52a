use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use std::fmt;
use std::sync::Arc;

/// A permutation of the indices of an alphabet, given in cycle notation
///
/// The cycles are parsed once into forward and inverse lookup tables, so
/// `permute` and `invert` are constant time. Characters of the alphabet
/// that appear in no cycle map to themselves.
#[derive(Debug, Clone)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    cycles: Vec<Vec<char>>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Parse `cycles`, a string of the form "(cccc) (cc) ...", over `alphabet`
    /// Whitespace between groups is ignored
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self> {
        let cycles = parse_cycles(cycles)?;
        Self::from_cycles(cycles, alphabet)
    }

    /// The permutation that maps every index to itself
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let n = alphabet.size();
        Self {
            alphabet,
            cycles: Vec::new(),
            forward: (0..n).collect(),
            inverse: (0..n).collect(),
        }
    }

    /// Build from already split cycles; they must be disjoint
    pub fn from_cycles(cycles: Vec<Vec<char>>, alphabet: Arc<Alphabet>) -> Result<Self> {
        let (forward, inverse) = build_tables(&cycles, &alphabet)?;
        Ok(Self {
            alphabet,
            cycles,
            forward,
            inverse,
        })
    }

    /// Add the cycle c0->c1->...->cm->c0, written either bare ("ABC") or in
    /// cycle notation ("(ABC)", possibly several groups)
    /// The permutation is left untouched if the result would be invalid
    pub fn add_cycle(&mut self, cycle: &str) -> Result<()> {
        let cycle = cycle.trim();
        let added = if cycle.starts_with('(') {
            parse_cycles(cycle)?
        } else {
            if cycle.is_empty() || cycle.chars().any(|c| c.is_whitespace() || c == ')') {
                return Err(EnigmaError::MalformedCycle(cycle.to_string()));
            }
            vec![cycle.chars().collect()]
        };

        let mut cycles = self.cycles.clone();
        cycles.extend(added);
        let (forward, inverse) = build_tables(&cycles, &self.alphabet)?;

        self.cycles = cycles;
        self.forward = forward;
        self.inverse = inverse;
        Ok(())
    }

    /// Reduce `p` into 0..size() with floor-mod semantics
    pub fn wrap(&self, p: i64) -> usize {
        p.rem_euclid(self.size() as i64) as usize
    }

    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Apply the permutation to `p` modulo the alphabet size
    pub fn permute(&self, p: usize) -> usize {
        self.forward[p % self.size()]
    }

    /// Apply the inverse permutation to `c` modulo the alphabet size
    pub fn invert(&self, c: usize) -> usize {
        self.inverse[c % self.size()]
    }

    pub fn permute_char(&self, p: char) -> Result<char> {
        let index = self.permute(self.alphabet.to_int(p)?);
        self.alphabet.to_char(index)
    }

    pub fn invert_char(&self, c: char) -> Result<char> {
        let index = self.invert(self.alphabet.to_int(c)?);
        self.alphabet.to_char(index)
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn cycles(&self) -> &[Vec<char>] {
        &self.cycles
    }

    /// Rebind to `alphabet`, which must have the same size and contain every
    /// character named by the cycles
    pub fn change_alphabet(&mut self, alphabet: Arc<Alphabet>) -> Result<()> {
        if alphabet.size() != self.size() {
            return Err(EnigmaError::AlphabetMismatch {
                expected: self.size(),
                found: alphabet.size(),
            });
        }
        let (forward, inverse) = build_tables(&self.cycles, &alphabet)?;
        self.alphabet = alphabet;
        self.forward = forward;
        self.inverse = inverse;
        Ok(())
    }

    /// True iff no index maps to itself
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &p)| p != i)
    }

    /// True iff applying the permutation twice is the identity
    pub fn is_involution(&self) -> bool {
        self.forward.iter().all(|&p| self.forward[p] == self.inverse[p])
    }

    /// Number of indices that do not map to themselves
    pub fn moved(&self) -> usize {
        self.forward.iter().enumerate().filter(|(i, &p)| p != *i).count()
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, cycle) in self.cycles.iter().enumerate() {
            if n > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for ch in cycle {
                write!(f, "{}", ch)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Split cycle notation into its groups
pub fn parse_cycles(text: &str) -> Result<Vec<Vec<char>>> {
    let mut cycles = Vec::new();
    let mut current: Option<Vec<char>> = None;

    for ch in text.chars() {
        match ch {
            '(' => {
                if current.is_some() {
                    return Err(EnigmaError::MalformedCycle(format!("nested '(' in {}", text)));
                }
                current = Some(Vec::new());
            }
            ')' => match current.take() {
                Some(cycle) if !cycle.is_empty() => cycles.push(cycle),
                Some(_) => {
                    return Err(EnigmaError::MalformedCycle(format!("empty cycle in {}", text)))
                }
                None => {
                    return Err(EnigmaError::MalformedCycle(format!("unmatched ')' in {}", text)))
                }
            },
            c if c.is_whitespace() => {
                if current.is_some() {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "whitespace inside cycle in {}",
                        text
                    )));
                }
            }
            c => match current.as_mut() {
                Some(cycle) => cycle.push(c),
                None => {
                    return Err(EnigmaError::MalformedCycle(format!(
                        "{:?} outside of a cycle in {}",
                        c, text
                    )))
                }
            },
        }
    }

    if current.is_some() {
        return Err(EnigmaError::MalformedCycle(format!("no ')' at the end of {}", text)));
    }
    Ok(cycles)
}

/// Expand disjoint cycles into forward and inverse index tables
fn build_tables(cycles: &[Vec<char>], alphabet: &Alphabet) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = alphabet.size();
    let mut forward: Vec<usize> = (0..n).collect();
    let mut seen = vec![false; n];

    for cycle in cycles {
        let indices = cycle
            .iter()
            .map(|&c| alphabet.to_int(c))
            .collect::<Result<Vec<usize>>>()?;

        for (k, &from) in indices.iter().enumerate() {
            if seen[from] {
                return Err(EnigmaError::MalformedCycle(format!(
                    "{:?} appears in more than one cycle",
                    cycle[k]
                )));
            }
            seen[from] = true;
            forward[from] = indices[(k + 1) % indices.len()];
        }
    }

    let mut inverse = vec![0usize; n];
    for (i, &p) in forward.iter().enumerate() {
        inverse[p] = i;
    }
    Ok((forward, inverse))
}
