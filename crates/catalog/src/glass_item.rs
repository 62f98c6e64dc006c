use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use molten_core::natural_key::{display_code, is_stable_id, stable_id};
use molten_core::{DomainError, DomainResult, Entity, NaturalKey, ValueObject};

/// Coefficient of expansion: which glasses can be fused together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Coe {
    Coe33,
    Coe90,
    Coe96,
    Coe104,
    Other(u16),
}

impl ValueObject for Coe {}

impl Coe {
    pub fn value(self) -> u16 {
        match self {
            Coe::Coe33 => 33,
            Coe::Coe90 => 90,
            Coe::Coe96 => 96,
            Coe::Coe104 => 104,
            Coe::Other(v) => v,
        }
    }
}

impl From<u16> for Coe {
    fn from(value: u16) -> Self {
        match value {
            33 => Coe::Coe33,
            90 => Coe::Coe90,
            96 => Coe::Coe96,
            104 => Coe::Coe104,
            v => Coe::Other(v),
        }
    }
}

impl FromStr for Coe {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("COE")
            .or_else(|| trimmed.strip_prefix("coe"))
            .unwrap_or(trimmed)
            .trim();
        let value = digits
            .parse::<u16>()
            .map_err(|_| DomainError::validation(format!("invalid COE '{s}'")))?;
        if value == 0 {
            return Err(DomainError::validation("COE must be positive"));
        }
        Ok(Coe::from(value))
    }
}

impl TryFrom<String> for Coe {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coe> for String {
    fn from(value: Coe) -> Self {
        value.value().to_string()
    }
}

impl fmt::Display for Coe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Input for creating a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGlassItem {
    pub manufacturer: String,
    pub code: String,
    #[serde(default)]
    pub sequence: u32,
    pub name: String,
    pub coe: Coe,
    #[serde(default)]
    pub manufacturer_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Id published with an earlier catalog; kept as is when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
}

impl NewGlassItem {
    pub(crate) fn persisted_stable_id(&self) -> Option<&str> {
        self.stable_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Canonical catalog record for one glass product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassItem {
    natural_key: NaturalKey,
    stable_id: String,
    manufacturer: String,
    code: String,
    name: String,
    coe: Coe,
    manufacturer_url: Option<String>,
    tags: Vec<String>,
}

impl GlassItem {
    /// Validate a draft and settle its stable id.
    ///
    /// A persisted stable id is kept; otherwise one is generated from the
    /// manufacturer and code as written. `taken_ids` holds stable ids already
    /// in use by the catalog.
    pub fn create(draft: NewGlassItem, taken_ids: &HashSet<String>) -> DomainResult<Self> {
        if draft.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let natural_key = NaturalKey::new(&draft.manufacturer, &draft.code, draft.sequence)?;

        let stable_id = match draft.persisted_stable_id() {
            Some(id) if !is_stable_id(id) => {
                return Err(DomainError::validation(format!("malformed stable id '{id}'")));
            }
            Some(id) if taken_ids.contains(id) => {
                return Err(DomainError::conflict(format!(
                    "stable id {id} is already used in the catalog"
                )));
            }
            Some(id) => id.to_string(),
            None => stable_id(draft.manufacturer.trim(), draft.code.trim(), taken_ids)?,
        };

        let mut tags: Vec<String> = draft
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();

        Ok(Self {
            natural_key,
            stable_id,
            manufacturer: draft.manufacturer.trim().to_string(),
            code: draft.code.trim().to_string(),
            name: draft.name.trim().to_string(),
            coe: draft.coe,
            manufacturer_url: draft.manufacturer_url.filter(|url| !url.trim().is_empty()),
            tags,
        })
    }

    pub fn natural_key(&self) -> &NaturalKey {
        &self.natural_key
    }

    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coe(&self) -> Coe {
        self.coe
    }

    pub fn manufacturer_url(&self) -> Option<&str> {
        self.manufacturer_url.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Label-style code, e.g. `CIM-511101`.
    pub fn display_code(&self) -> String {
        display_code(&self.manufacturer, &self.code)
    }

    /// Whether this item matches a manufacturer/code pair, ignoring case.
    pub fn matches(&self, manufacturer: &str, code: &str) -> bool {
        self.manufacturer.eq_ignore_ascii_case(manufacturer.trim())
            && self.code.eq_ignore_ascii_case(code.trim())
    }
}

impl Entity for GlassItem {
    type Id = NaturalKey;

    fn id(&self) -> &Self::Id {
        &self.natural_key
    }
}
