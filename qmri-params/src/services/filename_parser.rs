//! MPRAGE filename grammar
//!
//! `sub-<label>_ses-<label>_acq-<label>_inv-<int>[_echo-<int>][_part-<mag|phase>]_MPRAGE.<nii|nii.gz|json>`

use crate::models::{FileExtension, ParsedFilename, Part};
use once_cell::sync::Lazy;
use qmri_common::{Error, Result};
use regex::Regex;

/// Suffix shared by every file the grammar applies to
pub const MPRAGE_SUFFIX: &str = "_MPRAGE";

static MPRAGE_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^sub-(?P<subject>[A-Za-z0-9]+)_ses-(?P<session>[A-Za-z0-9]+)_acq-(?P<acquisition>[A-Za-z0-9]+)_inv-(?P<inversion>[0-9]+)(?:_echo-(?P<echo>[0-9]+))?(?:_part-(?P<part>mag|phase))?_MPRAGE\.(?P<extension>nii\.gz|nii|json)$",
    )
    .expect("MPRAGE filename pattern is valid")
});

static B1MAP_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^sub-(?P<subject>[A-Za-z0-9]+)(?:_ses-(?P<session>[A-Za-z0-9]+))?(?:_[a-z]+-[A-Za-z0-9]+)*_B1map\.nii(?:\.gz)?$",
    )
    .expect("B1 map filename pattern is valid")
});

/// Subject and optional session of a B1 map file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct B1MapName {
    pub subject: String,
    pub session: Option<String>,
}

/// Parse a B1 field map file name, `None` for anything else
pub fn parse_b1map_filename(file_name: &str) -> Option<B1MapName> {
    let caps = B1MAP_FILENAME.captures(file_name)?;
    Some(B1MapName {
        subject: caps["subject"].to_string(),
        session: caps.name("session").map(|m| m.as_str().to_string()),
    })
}

/// True when `file_name` claims to be an MPRAGE image or sidecar
///
/// Candidates that then fail [`parse_mprage_filename`] are worth a warning;
/// anything else is simply not part of an acquisition.
pub fn is_mprage_candidate(file_name: &str) -> bool {
    ["nii", "nii.gz", "json"]
        .iter()
        .any(|ext| file_name.ends_with(&format!("{}.{}", MPRAGE_SUFFIX, ext)))
}

/// Parse a bare file name (no directory components)
pub fn parse_mprage_filename(file_name: &str) -> Result<ParsedFilename> {
    let caps = MPRAGE_FILENAME
        .captures(file_name)
        .ok_or_else(|| Error::MalformedFilename(file_name.to_string()))?;

    let integer = |name: &str| -> Result<u32> {
        caps[name]
            .parse::<u32>()
            .map_err(|_| Error::MalformedFilename(format!("{}: {} out of range", file_name, name)))
    };

    let echo = match caps.name("echo") {
        Some(_) => Some(integer("echo")?),
        None => None,
    };

    Ok(ParsedFilename {
        subject: caps["subject"].to_string(),
        session: caps["session"].to_string(),
        acquisition: caps["acquisition"].to_string(),
        inversion: integer("inversion")?,
        echo,
        part: caps.name("part").and_then(|m| Part::from_label(m.as_str())),
        extension: FileExtension::from_label(&caps["extension"])
            .ok_or_else(|| Error::MalformedFilename(file_name.to_string()))?,
    })
}
