use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnigmaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration truncated: {0}")]
    TruncatedConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown rotor: {0}")]
    UnknownRotor(String),

    #[error("Rotor {0} inserted more than once")]
    DuplicateRotor(String),

    #[error("First rotor must be a reflector, found {0}")]
    MissingReflector(String),

    #[error("Rotor stack mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Malformed cycle: {0}")]
    MalformedCycle(String),

    #[error("Invalid plugboard: {0}")]
    InvalidPlugboard(String),

    #[error("Invalid reflector {0}: permutation must be an involution with no fixed points")]
    InvalidReflector(String),

    #[error("Reflector has only one position, cannot set it to {0}")]
    IllegalReflectorPosition(usize),

    #[error("Character {0:?} is not in the alphabet")]
    InvalidCharacter(char),

    #[error("Index {index} out of range for alphabet of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Alphabet size mismatch: expected {expected}, found {found}")]
    AlphabetMismatch { expected: usize, found: usize },

    #[error("Character {0:?} appears more than once in the alphabet")]
    DuplicateCharacter(char),

    #[error("Alphabet must contain at least one character")]
    EmptyAlphabet,

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Message found before any settings line")]
    MissingSettings,

    #[error("No rotors inserted")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, EnigmaError>;
