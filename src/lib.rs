//! Enigma - Rotor Cipher Machine Simulator
//!
//! Simulates an electromechanical rotor cipher machine: a stack of
//! interchangeable rotors, each a fixed permutation of an alphabet, composed
//! with a plugboard. Every key press first steps the moving rotors, then
//! sends the character through the machine and back.
//!
//! ## Signal Path
//!
//! ```text
//! Plugboard → Rotors (right to left) → Reflector → Rotors (left to right) → Plugboard
//! ```
//!
//! - **Alphabet**: characters ↔ indices
//! - **Permutation**: cycle notation parsed into forward/inverse tables
//! - **Rotor**: reflector, fixed or moving; a permutation offset by its setting
//! - **Machine**: rotor catalog, active stack, plugboard and the stepping
//!   mechanism, including the double step of the middle rotor
//!
//! ## Example
//!
//! ```
//! use enigma::config::read_config;
//!
//! let mut machine = read_config(
//!     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 4 3
//!      B R (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)
//!      I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!      II ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
//!      III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)",
//! ).unwrap();
//!
//! machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
//! machine.set_rotors("AAA").unwrap();
//! assert_eq!(machine.convert_str("AAAAA").unwrap(), "BDZGO");
//! ```

pub mod alphabet;
pub mod cli;
pub mod config;
pub mod error;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod settings;

pub use alphabet::Alphabet;
pub use error::{EnigmaError, Result};
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};
pub use settings::Settings;
