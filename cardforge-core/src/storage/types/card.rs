//! Card storage types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::storage::ids::CardId;
use crate::storage::types::stored::{Editable, Stored};

/// Card document schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CardSpec {
    CharaCardV2,
    CharaCardV3,
    LorebookV3,
    Collection,
    Other(String),
}

impl fmt::Display for CardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSpec::CharaCardV2 => f.write_str("chara_card_v2"),
            CardSpec::CharaCardV3 => f.write_str("chara_card_v3"),
            CardSpec::LorebookV3 => f.write_str("lorebook_v3"),
            CardSpec::Collection => f.write_str("collection"),
            CardSpec::Other(s) => f.write_str(s),
        }
    }
}

impl FromStr for CardSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" => Err("card spec must not be empty".to_string()),
            "chara_card_v2" => Ok(CardSpec::CharaCardV2),
            "chara_card_v3" => Ok(CardSpec::CharaCardV3),
            "lorebook_v3" => Ok(CardSpec::LorebookV3),
            "collection" => Ok(CardSpec::Collection),
            other => Ok(CardSpec::Other(other.to_string())),
        }
    }
}

impl From<CardSpec> for String {
    fn from(spec: CardSpec) -> String {
        spec.to_string()
    }
}

impl TryFrom<String> for CardSpec {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Card content (input form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    pub spec: CardSpec,
    /// Full card payload as authored
    pub data: Value,
    /// Number of declared actor slots
    #[serde(default)]
    pub actor_count: u32,
}

impl Card {
    pub fn new(name: impl Into<String>, spec: CardSpec, data: Value) -> Self {
        Self {
            name: name.into(),
            spec,
            data,
            actor_count: 0,
        }
    }

    pub fn with_actor_count(mut self, actor_count: u32) -> Self {
        self.actor_count = actor_count;
        self
    }
}

/// A stored, editable card
pub type StoredCard = Stored<CardId, Editable<Card>>;
