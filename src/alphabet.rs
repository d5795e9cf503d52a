use crate::error::{EnigmaError, Result};
use std::collections::HashMap;
use std::fmt;

/// The upper-case Latin alphabet used when a configuration does not say otherwise
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered set of encodable characters
/// The K-th character has index K; no character may repeat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Build an alphabet from the characters of `chars`, in order
    pub fn new(chars: &str) -> Result<Self> {
        let chars: Vec<char> = chars.chars().collect();
        if chars.is_empty() {
            return Err(EnigmaError::EmptyAlphabet);
        }

        let mut index = HashMap::with_capacity(chars.len());
        for (i, &ch) in chars.iter().enumerate() {
            if index.insert(ch, i).is_some() {
                return Err(EnigmaError::DuplicateCharacter(ch));
            }
        }

        Ok(Self { chars, index })
    }

    pub fn size(&self) -> usize {
        self.chars.len()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    /// Character at `index`, which must be below `size()`
    pub fn to_char(&self, index: usize) -> Result<char> {
        self.chars
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Index of `ch`; the inverse of `to_char`
    pub fn to_int(&self, ch: char) -> Result<usize> {
        self.index
            .get(&ch)
            .copied()
            .ok_or(EnigmaError::InvalidCharacter(ch))
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        let chars: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        let index = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { chars, index }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}
