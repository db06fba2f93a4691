//! Acquisition file identities
//!
//! A file name such as
//! `sub-01_ses-1_acq-memp2rage_inv-2_echo-3_part-phase_MPRAGE.nii.gz`
//! carries the whole identity of the image; these types hold it in typed form.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Image component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Mag,
    Phase,
}

impl Part {
    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Mag => "mag",
            Part::Phase => "phase",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "mag" => Some(Part::Mag),
            "phase" => Some(Part::Phase),
            _ => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognised file extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileExtension {
    Nii,
    NiiGz,
    Json,
}

impl FileExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExtension::Nii => "nii",
            FileExtension::NiiGz => "nii.gz",
            FileExtension::Json => "json",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "nii" => Some(FileExtension::Nii),
            "nii.gz" => Some(FileExtension::NiiGz),
            "json" => Some(FileExtension::Json),
            _ => None,
        }
    }

    /// True for NIfTI images, false for sidecar documents
    pub fn is_image(&self) -> bool {
        !matches!(self, FileExtension::Json)
    }
}

/// Entities parsed from one file name, exactly as written
///
/// `echo` and `part` stay optional here so a parsed name can be written
/// back unchanged; [`ParsedFilename::echo`] and [`ParsedFilename::part`]
/// apply the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedFilename {
    pub subject: String,
    pub session: String,
    pub acquisition: String,
    pub inversion: u32,
    pub echo: Option<u32>,
    pub part: Option<Part>,
    pub extension: FileExtension,
}

impl ParsedFilename {
    /// Echo index, 1 when the entity is absent
    pub fn echo(&self) -> u32 {
        self.echo.unwrap_or(1)
    }

    /// Image part, magnitude when the entity is absent
    pub fn part(&self) -> Part {
        self.part.unwrap_or(Part::Mag)
    }

    /// Sidecar join key (part-agnostic)
    pub fn sidecar_key(&self) -> SidecarKey {
        SidecarKey {
            subject: self.subject.clone(),
            session: self.session.clone(),
            acquisition: self.acquisition.clone(),
            inversion: self.inversion,
            echo: self.echo(),
        }
    }

    /// Write the identity back as a file name
    pub fn file_name(&self) -> String {
        let mut name = format!(
            "sub-{}_ses-{}_acq-{}_inv-{}",
            self.subject, self.session, self.acquisition, self.inversion
        );
        if let Some(echo) = self.echo {
            name.push_str(&format!("_echo-{}", echo));
        }
        if let Some(part) = self.part {
            name.push_str(&format!("_part-{}", part));
        }
        name.push_str("_MPRAGE.");
        name.push_str(self.extension.as_str());
        name
    }
}

/// Lookup key of an image within one subject/session context
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey {
    pub acquisition: String,
    pub inversion: u32,
    pub echo: u32,
    pub part: Part,
}

impl IndexKey {
    pub fn new(acquisition: &str, inversion: u32, echo: u32, part: Part) -> Self {
        Self {
            acquisition: acquisition.to_string(),
            inversion,
            echo,
            part,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acq-{}_inv-{}_echo-{}_part-{}",
            self.acquisition, self.inversion, self.echo, self.part
        )
    }
}

/// Join key between images and sidecars
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SidecarKey {
    pub subject: String,
    pub session: String,
    pub acquisition: String,
    pub inversion: u32,
    pub echo: u32,
}

/// One physical image file
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFileRecord {
    pub subject: String,
    pub session: String,
    pub acquisition: String,
    pub inversion: u32,
    pub echo: u32,
    pub part: Part,
    pub path: PathBuf,
    pub extension: FileExtension,
}

impl ImageFileRecord {
    /// Build a record from a parsed image file name
    pub fn from_parsed(parsed: &ParsedFilename, path: PathBuf) -> Self {
        Self {
            subject: parsed.subject.clone(),
            session: parsed.session.clone(),
            acquisition: parsed.acquisition.clone(),
            inversion: parsed.inversion,
            echo: parsed.echo(),
            part: parsed.part(),
            path,
            extension: parsed.extension,
        }
    }

    pub fn key(&self) -> IndexKey {
        IndexKey::new(&self.acquisition, self.inversion, self.echo, self.part)
    }

    pub fn sidecar_key(&self) -> SidecarKey {
        SidecarKey {
            subject: self.subject.clone(),
            session: self.session.clone(),
            acquisition: self.acquisition.clone(),
            inversion: self.inversion,
            echo: self.echo,
        }
    }
}
