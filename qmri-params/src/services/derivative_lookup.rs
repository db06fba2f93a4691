//! Derivative file lookup
//!
//! Earlier pipeline stages write their outputs as
//!
//! ```text
//! <derivatives>/<pipeline>/sub-<subject>[/ses-<session>]/<modality>/
//!     sub-<subject>[_ses-<session>][_acq-<acq>][_space-<space>][_desc-<desc>]_<suffix>.nii[.gz]
//! ```
//!
//! Lookups resolve to zero or one existing file; more than one candidate is
//! always reported rather than picking one.

use qmri_common::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 2] = ["nii.gz", "nii"];

/// Entities identifying one derivative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeQuery {
    pub pipeline: String,
    pub modality: String,
    pub subject: String,
    pub session: Option<String>,
    pub acquisition: Option<String>,
    pub space: Option<String>,
    pub description: Option<String>,
    pub suffix: String,
}

impl DerivativeQuery {
    /// Anatomical derivative with only the mandatory entities set
    pub fn new(pipeline: &str, subject: &str, suffix: &str) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            modality: "anat".to_string(),
            subject: subject.to_string(),
            session: None,
            acquisition: None,
            space: None,
            description: None,
            suffix: suffix.to_string(),
        }
    }

    pub fn modality(mut self, modality: &str) -> Self {
        self.modality = modality.to_string();
        self
    }

    pub fn session(mut self, session: Option<&str>) -> Self {
        self.session = session.map(str::to_string);
        self
    }

    pub fn acquisition(mut self, acquisition: &str) -> Self {
        self.acquisition = Some(acquisition.to_string());
        self
    }

    pub fn space(mut self, space: &str) -> Self {
        self.space = Some(space.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Directory the derivative lives in
    pub fn directory(&self, derivatives: &Path) -> PathBuf {
        let mut dir = derivatives
            .join(&self.pipeline)
            .join(format!("sub-{}", self.subject));
        if let Some(session) = &self.session {
            dir.push(format!("ses-{}", session));
        }
        dir.push(&self.modality);
        dir
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        let mut stem = format!("sub-{}", self.subject);
        let entities = [
            ("ses", &self.session),
            ("acq", &self.acquisition),
            ("space", &self.space),
            ("desc", &self.description),
        ];
        for (entity, value) in entities {
            if let Some(value) = value {
                stem.push_str(&format!("_{}-{}", entity, value));
            }
        }
        stem.push('_');
        stem.push_str(&self.suffix);
        stem
    }

    fn describe(&self, derivatives: &Path) -> String {
        self.directory(derivatives)
            .join(format!("{}.nii[.gz]", self.stem()))
            .display()
            .to_string()
    }
}

/// Resolves derivative files under one derivatives root
pub struct DerivativeLookup {
    root: PathBuf,
}

impl DerivativeLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `query` to its file
    ///
    /// A missing file is `DerivativeNotFound` when `required`, `Ok(None)` otherwise.
    pub fn find(&self, query: &DerivativeQuery, required: bool) -> Result<Option<PathBuf>> {
        let directory = query.directory(&self.root);
        let stem = query.stem();

        let mut candidates: Vec<PathBuf> = IMAGE_EXTENSIONS
            .iter()
            .map(|ext| directory.join(format!("{}.{}", stem, ext)))
            .filter(|path| path.is_file())
            .collect();

        match candidates.len() {
            0 if required => Err(Error::DerivativeNotFound(query.describe(&self.root))),
            0 => {
                tracing::debug!(derivative = %query.describe(&self.root), "Optional derivative absent");
                Ok(None)
            }
            1 => Ok(candidates.pop()),
            _ => Err(Error::AmbiguousDerivative(candidates)),
        }
    }

    /// Find the single `_<suffix>` image of a subject anywhere in a pipeline
    ///
    /// `filter` further requires a substring of the file name.
    pub fn find_by_suffix(
        &self,
        pipeline: &str,
        subject: &str,
        suffix: &str,
        filter: Option<&str>,
    ) -> Result<PathBuf> {
        let subject_dir = self.root.join(pipeline).join(format!("sub-{}", subject));
        if !subject_dir.is_dir() {
            return Err(Error::DerivativeNotFound(subject_dir.display().to_string()));
        }
        let prefix = format!("sub-{}_", subject);
        let endings: Vec<String> = IMAGE_EXTENSIONS
            .iter()
            .map(|ext| format!("_{}.{}", suffix, ext))
            .collect();

        let mut candidates: Vec<PathBuf> = WalkDir::new(&subject_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.starts_with(&prefix)
                    && endings.iter().any(|ending| name.ends_with(ending.as_str()))
                    && filter.map_or(true, |f| name.contains(f))
            })
            .map(|entry| entry.into_path())
            .collect();
        candidates.sort();

        match candidates.len() {
            0 => Err(Error::DerivativeNotFound(format!(
                "{} sub-{} *_{}{}",
                pipeline,
                subject,
                suffix,
                filter.map(|f| format!(" matching '{}'", f)).unwrap_or_default()
            ))),
            1 => Ok(candidates.remove(0)),
            _ => Err(Error::AmbiguousDerivative(candidates)),
        }
    }
}
