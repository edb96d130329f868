//! The slice of the terminal description database the screen needs.

use log::debug;
use terminfo::{Database, Value};

use crate::Result;

/// Terminal description values read once when a screen is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCaps {
    /// Terminal name the description was loaded for.
    pub name: String,
    /// `colors`, zero when absent.
    pub colors: u32,
    /// `pairs`, zero when absent.
    pub pairs: u32,
    /// `smkx`, switches the keypad into application mode.
    pub keypad_xmit: Option<Vec<u8>>,
    /// `rmkx`, switches the keypad back to local mode.
    pub keypad_local: Option<Vec<u8>>,
}

impl TermCaps {
    /// Load the description of `term`, or of `$TERM` when `None`.
    pub fn load(term: Option<&str>) -> Result<Self> {
        let database = match term {
            Some(name) => Database::from_name(name)?,
            None => Database::from_env()?,
        };

        let caps = Self::from_database(&database);
        debug!(
            "loaded terminfo for {}: colors={} pairs={} keypad={}",
            caps.name,
            caps.colors,
            caps.pairs,
            caps.keypad_xmit.is_some()
        );
        Ok(caps)
    }

    pub fn from_database(database: &Database) -> Self {
        Self {
            name: database.name().to_owned(),
            colors: number(database, "colors"),
            pairs: number(database, "pairs"),
            keypad_xmit: string(database, "smkx"),
            keypad_local: string(database, "rmkx"),
        }
    }
}

// Absent and cancelled numbers both read as zero.
fn number(database: &Database, name: &str) -> u32 {
    match database.raw(name) {
        Some(Value::Number(value)) => u32::try_from(*value).unwrap_or(0),
        _ => 0,
    }
}

fn string(database: &Database, name: &str) -> Option<Vec<u8>> {
    match database.raw(name) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}
