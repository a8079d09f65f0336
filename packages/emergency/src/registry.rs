//! Compile-time registry of emergency contacts.
//!
//! The ordered contact directory lives in `contacts.toml` and is embedded
//! at compile time. Order is load-bearing: SOS events notify a fixed-size
//! prefix of this list.

use serde::{Deserialize, Serialize};

/// One entry in the ordered emergency contact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Contact label (e.g. `"police"`).
    pub name: String,
    /// Dialable number.
    pub number: String,
}

#[derive(Debug, Deserialize)]
struct ContactsFile {
    contact: Vec<EmergencyContact>,
}

const CONTACTS_TOML: &str = include_str!("../contacts.toml");

/// Returns the ordered emergency contact directory.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn default_contacts() -> Vec<EmergencyContact> {
    let file: ContactsFile = toml::de::from_str(CONTACTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded emergency contacts: {e}"));
    file.contact
}
