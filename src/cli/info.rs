use crate::config::load_config;
use crate::error::Result;
use crate::machine::Machine;
use crate::rotor::{Rotor, RotorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rotor type as written in a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotorType {
    Reflector,
    Fixed,
    Moving,
}

/// Description of one catalog rotor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotorSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub rotor_type: RotorType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notches: String,
    /// Normalized cycle notation
    pub cycles: String,
}

impl From<&Rotor> for RotorSummary {
    fn from(rotor: &Rotor) -> Self {
        let rotor_type = match rotor.kind() {
            RotorKind::Reflector => RotorType::Reflector,
            RotorKind::Fixed => RotorType::Fixed,
            RotorKind::Moving { .. } => RotorType::Moving,
        };
        Self {
            name: rotor.name().to_string(),
            rotor_type,
            notches: rotor.notches().iter().collect(),
            cycles: rotor.permutation().to_string(),
        }
    }
}

/// Description of a configured machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub alphabet: String,
    pub num_rotors: usize,
    pub pawls: usize,
    pub rotors: Vec<RotorSummary>,
}

impl From<&Machine> for ConfigSummary {
    fn from(machine: &Machine) -> Self {
        Self {
            alphabet: machine.alphabet().to_string(),
            num_rotors: machine.num_rotors(),
            pawls: machine.num_pawls(),
            rotors: machine.catalog().iter().map(RotorSummary::from).collect(),
        }
    }
}

/// Describe the configuration file at `path` as pretty-printed JSON
pub fn describe_config(path: &Path) -> Result<String> {
    let machine = load_config(path)?;
    let summary = ConfigSummary::from(&machine);
    Ok(serde_json::to_string_pretty(&summary)?)
}
