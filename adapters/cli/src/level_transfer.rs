//! Single-line campaign transfer strings for sharing generated mazes.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_drive_core::{Difficulty, LevelBlueprint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "drive";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded campaign payload.
pub(crate) const SNAPSHOT_HEADER: &str = "drive:v1";
/// Delimiter used to separate the prefix, level count and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a complete campaign: its fuel rule and level blueprints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CampaignSnapshot {
    /// Fuel rule applied for the whole campaign.
    pub difficulty: Difficulty,
    /// Ordered level blueprints composing the campaign.
    pub levels: Vec<LevelBlueprint>,
}

impl CampaignSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("campaign snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}:{encoded}", self.levels.len())
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LevelTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LevelTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
        let count = parts.next().ok_or(LevelTransferError::MissingLevelCount)?;
        let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
        }

        let count = parse_level_count(count)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LevelTransferError::InvalidEncoding)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

        if decoded.levels.len() != count {
            return Err(LevelTransferError::LevelCountMismatch {
                declared: count,
                found: decoded.levels.len(),
            });
        }
        if !decoded.levels.iter().all(LevelBlueprint::is_consistent) {
            return Err(LevelTransferError::InconsistentBlueprint);
        }

        Ok(decoded)
    }
}

/// Errors that can occur while decoding campaign transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("campaign payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded campaign.
    #[error("campaign string is missing the prefix")]
    MissingPrefix,
    /// The encoded campaign did not contain a version segment.
    #[error("campaign string is missing the version")]
    MissingVersion,
    /// The encoded campaign did not include its level count.
    #[error("campaign string is missing the level count")]
    MissingLevelCount,
    /// The encoded campaign did not include the payload segment.
    #[error("campaign string is missing the payload")]
    MissingPayload,
    /// The encoded campaign used an unexpected prefix segment.
    #[error("campaign prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded campaign used an unsupported version identifier.
    #[error("campaign version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The level count could not be parsed from the encoded campaign.
    #[error("could not parse level count '{0}'")]
    InvalidLevelCount(String),
    /// The declared level count did not match the decoded payload.
    #[error("campaign declares {declared} levels but the payload holds {found}")]
    LevelCountMismatch {
        /// Count parsed from the transfer string.
        declared: usize,
        /// Number of levels found in the payload.
        found: usize,
    },
    /// A decoded blueprint disagreed with its own declared dimensions.
    #[error("campaign payload contains an inconsistent level blueprint")]
    InconsistentBlueprint,
    /// The base64 payload could not be decoded.
    #[error("could not decode campaign payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse campaign payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_level_count(count: &str) -> Result<usize, LevelTransferError> {
    let parsed = count
        .trim()
        .parse::<usize>()
        .map_err(|_| LevelTransferError::InvalidLevelCount(count.to_owned()))?;

    if parsed == 0 {
        return Err(LevelTransferError::InvalidLevelCount(count.to_owned()));
    }

    Ok(parsed)
}
