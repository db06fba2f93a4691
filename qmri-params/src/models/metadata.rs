//! Sidecar metadata records

use super::acquisition::SidecarKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Sidecar field names read by the parameter resolver
pub mod fields {
    pub const INVERSION_REPETITION_TIME: &str = "InversionRepetitionTime";
    pub const INVERSION_TIME: &str = "InversionTime";
    pub const NUMBER_SHOTS: &str = "NumberShots";
    pub const FLIP_ANGLE: &str = "FlipAngle";
    pub const EXCITATION_REPETITION_TIME: &str = "ExcitationRepetitionTime";
    pub const ECHO_TIME: &str = "EchoTime";
}

/// Scalar sidecar value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(f64),
    Text(String),
    Bool(bool),
    NumberList(Vec<f64>),
}

/// Parsed sidecar document
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub key: SidecarKey,
    pub path: PathBuf,
    pub fields: BTreeMap<String, MetadataValue>,
}

impl MetadataRecord {
    pub fn get(&self, field: &str) -> Option<&MetadataValue> {
        self.fields.get(field)
    }
}
