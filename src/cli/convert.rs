use crate::config::load_config;
use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::settings::Settings;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Options for converting a stream of messages
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Characters per output group; 0 disables grouping
    pub group_size: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { group_size: 5 }
    }
}

/// Totals reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub settings: usize,
    pub messages: usize,
    pub characters: usize,
}

/// Configure a machine from `config_path` and convert the messages of
/// `input_path` (stdin if absent) into `output_path` (stdout if absent)
pub fn convert_files(
    config_path: &Path,
    input_path: Option<&Path>,
    output_path: Option<&Path>,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let mut machine = load_config(config_path)?;

    let input: Box<dyn BufRead> = match input_path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut output = BufWriter::new(output);

    let result = process_messages(&mut machine, input, &mut output, options);
    // Messages converted before a failure stay written
    output.flush()?;

    let summary = result?;
    info!(
        settings = summary.settings,
        messages = summary.messages,
        characters = summary.characters,
        "conversion finished"
    );
    Ok(summary)
}

/// Convert every message of `input`, writing one output line per input line
///
/// Settings lines reconfigure the machine and produce no output, blank
/// lines are copied as blank lines, and every other line is a message.
pub fn process_messages<R: BufRead, W: Write>(
    machine: &mut Machine,
    input: R,
    output: &mut W,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let mut summary = ConvertSummary::default();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if Settings::is_settings_line(&line) {
            let settings = Settings::parse(&line, machine.num_rotors())?;
            settings.apply(machine)?;
            summary.settings += 1;
            debug!(line = number + 1, positions = %machine.positions(), "new settings");
        } else if line.trim().is_empty() {
            writeln!(output)?;
        } else {
            if summary.settings == 0 {
                return Err(EnigmaError::MissingSettings);
            }
            let converted = convert_line(machine, &line)?;
            summary.messages += 1;
            summary.characters += converted.chars().count();
            writeln!(output, "{}", format_groups(&converted, options.group_size))?;
        }
    }

    if summary.settings == 0 {
        return Err(EnigmaError::MissingSettings);
    }
    Ok(summary)
}

/// Convert one message line
///
/// Whitespace is dropped. A character outside the alphabet is converted
/// as its upper-case form when that is in the alphabet, and is otherwise
/// copied unchanged without stepping the machine.
pub fn convert_line(machine: &mut Machine, line: &str) -> Result<String> {
    let alphabet = machine.alphabet().clone();
    let mut result = String::with_capacity(line.len());

    for ch in line.chars().filter(|c| !c.is_whitespace()) {
        let key = if alphabet.contains(ch) {
            Some(ch)
        } else {
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) if alphabet.contains(u) => Some(u),
                _ => None,
            }
        };

        match key {
            Some(key) => result.push(machine.convert_char(key)?),
            None => result.push(ch),
        }
    }
    Ok(result)
}

/// Split `msg` into space separated groups of `size` characters
/// The last group may be shorter
pub fn format_groups(msg: &str, size: usize) -> String {
    if size == 0 {
        return msg.to_string();
    }
    let chars: Vec<char> = msg.chars().collect();
    chars
        .chunks(size)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
