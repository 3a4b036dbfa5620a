//! # Event Filters
//!
//! Client-supplied predicates over contract events. A filter matches when its
//! type, contract-id and topic clauses all match; an empty clause matches
//! everything. Within a clause any alternative may match.
//!
//! Topic segments are `"*"` (any single topic) or a hex-encoded value that
//! must equal the topic byte-for-byte. A topic filter must consume the
//! event's topics exactly: `["*"]` does not match a two-topic event.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{ContractEvent, ContractEventType};

use super::errors::FilterError;

pub const MAX_CONTRACT_IDS: usize = 5;
pub const MAX_TOPICS: usize = 5;
pub const MAX_TOPIC_SEGMENTS: usize = 4;

/// One segment of a topic filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentFilter {
    Wildcard,
    Value(Vec<u8>),
}

impl SegmentFilter {
    fn matches(&self, topic: &[u8]) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Value(value) => value.as_slice() == topic,
        }
    }
}

impl Serialize for SegmentFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Wildcard => serializer.serialize_str("*"),
            Self::Value(value) => serializer.serialize_str(&hex::encode(value)),
        }
    }
}

impl<'de> Deserialize<'de> for SegmentFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "*" {
            return Ok(Self::Wildcard);
        }
        hex::decode(&s)
            .map(Self::Value)
            .map_err(|_| serde::de::Error::custom(format!("invalid topic segment {}", s)))
    }
}

/// Ordered segments matched against an event's topics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicFilter(pub Vec<SegmentFilter>);

impl TopicFilter {
    pub fn matches(&self, topics: &[Vec<u8>]) -> bool {
        self.0.len() == topics.len()
            && self
                .0
                .iter()
                .zip(topics)
                .all(|(segment, topic)| segment.matches(topic))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// `"system"`, `"contract"` or absent for both.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Hex-encoded 32-byte contract ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contract_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicFilter>,
}

impl EventFilter {
    pub fn validate(&self) -> Result<(), FilterError> {
        match self.event_type.as_deref() {
            None | Some("system") | Some("contract") => {}
            Some(_) => return Err(FilterError::InvalidEventType),
        }
        if self.contract_ids.len() > MAX_CONTRACT_IDS {
            return Err(FilterError::TooManyContractIds {
                max: MAX_CONTRACT_IDS,
            });
        }
        if self.topics.len() > MAX_TOPICS {
            return Err(FilterError::TooManyTopics { max: MAX_TOPICS });
        }
        for (i, id) in self.contract_ids.iter().enumerate() {
            match hex::decode(id) {
                Ok(bytes) if bytes.len() == 32 => {}
                _ => return Err(FilterError::InvalidContractId { position: i + 1 }),
            }
        }
        for (i, topic) in self.topics.iter().enumerate() {
            if topic.0.is_empty() || topic.0.len() > MAX_TOPIC_SEGMENTS {
                return Err(FilterError::InvalidTopicLength {
                    position: i + 1,
                    max: MAX_TOPIC_SEGMENTS,
                });
            }
        }
        Ok(())
    }

    pub fn matches(&self, event: &ContractEvent) -> bool {
        self.matches_event_type(event) && self.matches_contract_ids(event) && self.matches_topics(event)
    }

    fn matches_event_type(&self, event: &ContractEvent) -> bool {
        match self.event_type.as_deref() {
            Some("contract") => event.event_type == ContractEventType::Contract,
            Some("system") => event.event_type == ContractEventType::System,
            _ => true,
        }
    }

    fn matches_contract_ids(&self, event: &ContractEvent) -> bool {
        if self.contract_ids.is_empty() {
            return true;
        }
        let Some(contract_id) = event.contract_id else {
            return false;
        };
        let needle = hex::encode(contract_id);
        self.contract_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(&needle))
    }

    fn matches_topics(&self, event: &ContractEvent) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|topic| topic.matches(&event.topics))
    }
}

/// True when `filters` is empty or any filter matches.
pub fn matches_any(filters: &[EventFilter], event: &ContractEvent) -> bool {
    filters.is_empty() || filters.iter().any(|filter| filter.matches(event))
}
