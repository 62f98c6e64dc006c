//! Natural keys for catalog items.
//!
//! A natural key is derived from what is printed on the glass itself:
//! manufacturer abbreviation, manufacturer SKU and a variant sequence, joined
//! with dashes (`cim-511101-0`). Manufacturer codes are lowercased so lookups
//! do not depend on how a user typed them.

use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Alphabet for stable ids (no `I`, `O`, `i`, `l`, `o`).
const STABLE_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz";

/// Length of a generated stable id.
pub const STABLE_ID_LEN: usize = 6;

/// Natural key of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NaturalKey {
    manufacturer: String,
    code: String,
    sequence: u32,
}

impl ValueObject for NaturalKey {}

impl NaturalKey {
    /// Build a key, validating that manufacturer and code are not blank.
    pub fn new(manufacturer: &str, code: &str, sequence: u32) -> DomainResult<Self> {
        let manufacturer = manufacturer.trim();
        let code = code.trim();
        if manufacturer.is_empty() {
            return Err(DomainError::validation("manufacturer cannot be empty"));
        }
        if code.is_empty() {
            return Err(DomainError::validation("code cannot be empty"));
        }
        if manufacturer.contains('-') {
            return Err(DomainError::validation(format!(
                "manufacturer '{manufacturer}' cannot contain '-'"
            )));
        }
        Ok(Self {
            manufacturer: manufacturer.to_lowercase(),
            code: code.to_string(),
            sequence,
        })
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.manufacturer, self.code, self.sequence)
    }
}

impl FromStr for NaturalKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (manufacturer, code, sequence) = parse_natural_key(s)?;
        Self::new(&manufacturer, &code, sequence)
    }
}

impl TryFrom<String> for NaturalKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NaturalKey> for String {
    fn from(value: NaturalKey) -> Self {
        value.to_string()
    }
}

/// Format a natural key string: `{manufacturer}-{code}-{sequence}`.
pub fn natural_key(manufacturer: &str, code: &str, sequence: u32) -> String {
    format!(
        "{}-{}-{}",
        manufacturer.trim().to_lowercase(),
        code.trim(),
        sequence
    )
}

/// Split a natural key into (manufacturer, code, sequence).
///
/// The code may itself contain dashes (`bb-ab-12-0` has code `ab-12`), so the
/// manufacturer is the first segment and the sequence is the last.
pub fn parse_natural_key(key: &str) -> DomainResult<(String, String, u32)> {
    let key = key.trim();
    let (manufacturer, rest) = key
        .split_once('-')
        .ok_or_else(|| DomainError::invalid_id(format!("natural key '{key}' has no manufacturer")))?;
    let (code, sequence) = rest
        .rsplit_once('-')
        .ok_or_else(|| DomainError::invalid_id(format!("natural key '{key}' has no sequence")))?;

    if manufacturer.is_empty() || code.is_empty() {
        return Err(DomainError::invalid_id(format!(
            "natural key '{key}' has an empty segment"
        )));
    }

    let sequence = sequence.parse::<u32>().map_err(|e| {
        DomainError::invalid_id(format!("natural key '{key}' has a bad sequence: {e}"))
    })?;

    Ok((manufacturer.to_string(), code.to_string(), sequence))
}

/// Human-facing code shown on labels and lists, e.g. `CIM-511101`.
///
/// Manufacturers that already print their prefix into the SKU (`EF-204`)
/// are not prefixed twice.
pub fn display_code(manufacturer: &str, code: &str) -> String {
    let prefix = manufacturer.trim().to_uppercase();
    let code = code.trim();
    let already_prefixed = code
        .to_uppercase()
        .strip_prefix(&prefix)
        .is_some_and(|rest| rest.starts_with('-'));

    if prefix.is_empty() || already_prefixed {
        code.to_string()
    } else {
        format!("{prefix}-{code}")
    }
}

/// Whether `id` has the shape of a stable id (length and alphabet).
pub fn is_stable_id(id: &str) -> bool {
    id.len() == STABLE_ID_LEN && id.bytes().all(|b| STABLE_ID_ALPHABET.contains(&b))
}

/// Short id derived from SHA-256 of `"{manufacturer}:{code}"`, hashed as
/// written (case and all).
///
/// The same input always yields the same id unless it collides with an id in
/// `existing`. On collision the last character advances through the alphabet
/// by a growing step (+1, then +2 more, then +3 more, ...) until it is free.
pub fn stable_id(manufacturer: &str, code: &str, existing: &HashSet<String>) -> DomainResult<String> {
    let digest = Sha256::digest(format!("{manufacturer}:{code}").as_bytes());
    let mut num = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;

    let base = STABLE_ID_ALPHABET.len();
    let mut chars = [0u8; STABLE_ID_LEN];
    for slot in chars.iter_mut().rev() {
        *slot = STABLE_ID_ALPHABET[num % base];
        num /= base;
    }

    let last = STABLE_ID_LEN - 1;
    let mut candidate = String::from_utf8_lossy(&chars).into_owned();
    let mut step = 0;
    while existing.contains(&candidate) {
        step += 1;
        if step > base {
            return Err(DomainError::conflict(format!(
                "no free stable id for {manufacturer}:{code}"
            )));
        }
        let current = STABLE_ID_ALPHABET
            .iter()
            .position(|c| *c == chars[last])
            .unwrap_or(0);
        chars[last] = STABLE_ID_ALPHABET[(current + step) % base];
        candidate = String::from_utf8_lossy(&chars).into_owned();
    }

    Ok(candidate)
}
