//! Acquisition index builder
//!
//! Joins the image files of one subject/session/acquisition against their
//! JSON sidecars and indexes the result by `(acquisition, inversion, echo, part)`.
//!
//! **Algorithm:**
//! 1. Scan the dataset root (unparsable MPRAGE candidates are logged and skipped)
//! 2. Keep images matching the subject, session filter and acquisition
//! 3. Read the sidecars for the same entities from the directories holding those images
//! 4. Join on `(subject, session, acquisition, inversion, echo)` within the image's own directory; the image part is ignored
//! 5. Attach at most one B1 map for the subject/session
//!
//! The index is built per resolution call and never mutated afterwards.

use crate::models::{ImageFileRecord, IndexKey, MetadataRecord, Part, SidecarKey};
use crate::services::file_scanner::{FileScanner, ScanResult, ScannedFile};
use crate::services::sidecar_reader::read_sidecar;
use qmri_common::config::{DuplicatePolicy, IndexConfig};
use qmri_common::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Which acquisition to index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionQuery {
    pub subject: String,
    /// `None` matches any session
    pub session: Option<String>,
    pub acquisition: String,
}

impl AcquisitionQuery {
    pub fn new(subject: &str, session: Option<&str>, acquisition: &str) -> Self {
        Self {
            subject: subject.to_string(),
            session: session.map(str::to_string),
            acquisition: acquisition.to_string(),
        }
    }

    fn matches(&self, subject: &str, session: &str, acquisition: &str) -> bool {
        subject == self.subject
            && acquisition == self.acquisition
            && self.session.as_deref().map_or(true, |s| s == session)
    }
}

/// One image joined with its sidecar
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub image: ImageFileRecord,
    pub metadata: MetadataRecord,
}

/// Joined, read-only view of one acquisition
#[derive(Debug, Clone)]
pub struct AcquisitionIndex {
    query: AcquisitionQuery,
    rows: BTreeMap<IndexKey, IndexRow>,
    b1_map: Option<PathBuf>,
}

impl AcquisitionIndex {
    pub fn query(&self) -> &AcquisitionQuery {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in key order
    pub fn rows(&self) -> impl Iterator<Item = &IndexRow> {
        self.rows.values()
    }

    /// Calibration map shared by every row
    pub fn b1_map(&self) -> Option<&Path> {
        self.b1_map.as_deref()
    }

    /// Sessions the indexed images come from
    pub fn sessions(&self) -> BTreeSet<&str> {
        self.rows.values().map(|r| r.image.session.as_str()).collect()
    }

    pub fn get(&self, inversion: u32, echo: u32, part: Part) -> Option<&IndexRow> {
        self.rows
            .get(&IndexKey::new(&self.query.acquisition, inversion, echo, part))
    }

    /// Like [`get`](Self::get), failing with `ImageNotFoundInIndex`
    pub fn require(&self, inversion: u32, echo: u32, part: Part) -> Result<&IndexRow> {
        self.get(inversion, echo, part)
            .ok_or_else(|| Error::ImageNotFoundInIndex {
                acquisition: self.query.acquisition.clone(),
                inversion,
                echo,
                part: part.to_string(),
            })
    }

    /// Rows of one inversion and part, ascending by echo
    pub fn echoes(&self, inversion: u32, part: Part) -> Vec<&IndexRow> {
        // BTreeMap order is (acquisition, inversion, echo, part)
        self.rows
            .values()
            .filter(|r| r.image.inversion == inversion && r.image.part == part)
            .collect()
    }

    /// More than one magnitude echo at inversion 2
    pub fn is_multi_echo(&self) -> bool {
        self.echoes(2, Part::Mag).len() > 1
    }
}

/// Sidecars grouped by containing directory and join key
type SidecarMap = HashMap<(PathBuf, SidecarKey), Vec<MetadataRecord>>;

/// Builds [`AcquisitionIndex`] values from a dataset root
pub struct AcquisitionIndexBuilder {
    root: PathBuf,
    config: IndexConfig,
    scanner: FileScanner,
}

impl AcquisitionIndexBuilder {
    pub fn new(root: impl Into<PathBuf>, config: IndexConfig) -> Self {
        let scanner = FileScanner::with_ignore_patterns(config.ignore_patterns.clone());
        Self {
            root: root.into(),
            config,
            scanner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the dataset root once
    ///
    /// The result can be shared by several [`build_from_scan`](Self::build_from_scan) calls.
    pub fn scan(&self) -> Result<ScanResult> {
        self.scanner.scan(&self.root)
    }

    /// Scan the root and build the index for `query`
    pub fn build(&self, query: &AcquisitionQuery) -> Result<AcquisitionIndex> {
        let scan = self.scan()?;
        self.build_from_scan(query, &scan)
    }

    /// Build the index from an existing scan
    pub fn build_from_scan(
        &self,
        query: &AcquisitionQuery,
        scan: &ScanResult,
    ) -> Result<AcquisitionIndex> {
        let selected: Vec<&ScannedFile> = scan
            .files
            .iter()
            .filter(|f| {
                f.parsed.extension.is_image()
                    && query.matches(&f.parsed.subject, &f.parsed.session, &f.parsed.acquisition)
            })
            .collect();

        if selected.is_empty() {
            return Err(Error::NoImagesFound {
                subject: query.subject.clone(),
                session: query.session.clone(),
                acquisition: query.acquisition.clone(),
            });
        }

        let sidecars = self.load_sidecars(query, scan, &selected)?;

        let mut rows: BTreeMap<IndexKey, IndexRow> = BTreeMap::new();
        for file in selected {
            let image = ImageFileRecord::from_parsed(&file.parsed, file.path.clone());
            let metadata = self.join_sidecar(&image, &sidecars)?;

            let key = image.key();
            if let Some(existing) = rows.get(&key) {
                return Err(Error::DuplicateImage {
                    key: key.to_string(),
                    first: existing.image.path.clone(),
                    second: image.path,
                });
            }
            rows.insert(key, IndexRow { image, metadata });
        }

        let sessions: BTreeSet<String> = rows.values().map(|r| r.image.session.clone()).collect();
        let b1_map = if self.config.attach_b1_map {
            find_b1_map(query, &sessions, scan)?
        } else {
            None
        };

        tracing::debug!(
            subject = %query.subject,
            acquisition = %query.acquisition,
            rows = rows.len(),
            b1_map = b1_map.is_some(),
            "Acquisition index built"
        );

        Ok(AcquisitionIndex {
            query: query.clone(),
            rows,
            b1_map,
        })
    }

    /// Read sidecars that share a directory and entities with the selected images
    fn load_sidecars(
        &self,
        query: &AcquisitionQuery,
        scan: &ScanResult,
        selected: &[&ScannedFile],
    ) -> Result<SidecarMap> {
        let folders: BTreeSet<&Path> = selected.iter().filter_map(|f| f.path.parent()).collect();

        let mut sidecars = SidecarMap::new();
        for file in &scan.files {
            let folder = match file.path.parent() {
                Some(folder) if folders.contains(folder) => folder,
                _ => continue,
            };
            if file.parsed.extension.is_image()
                || !query.matches(&file.parsed.subject, &file.parsed.session, &file.parsed.acquisition)
            {
                continue;
            }
            let record = read_sidecar(&file.path, &file.parsed)?;
            sidecars
                .entry((folder.to_path_buf(), record.key.clone()))
                .or_default()
                .push(record);
        }
        Ok(sidecars)
    }

    /// Sidecars are only joined from the image's own directory
    fn join_sidecar(&self, image: &ImageFileRecord, sidecars: &SidecarMap) -> Result<MetadataRecord> {
        let folder = image.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut matches: Vec<&MetadataRecord> = sidecars
            .get(&(folder, image.sidecar_key()))
            .map(|records| records.iter().collect())
            .unwrap_or_default();
        matches.sort_by(|a, b| a.path.cmp(&b.path));

        match matches.as_slice() {
            [] => Err(Error::MissingMetadata(image.path.clone())),
            [only] => Ok((*only).clone()),
            [first, ..] => match self.config.duplicate_sidecars {
                DuplicatePolicy::Reject => Err(Error::AmbiguousMetadataJoin {
                    image: image.path.clone(),
                    sidecars: matches.iter().map(|m| m.path.clone()).collect(),
                }),
                DuplicatePolicy::FirstMatch => {
                    tracing::warn!(
                        image = %image.path.display(),
                        sidecar = %first.path.display(),
                        candidates = matches.len(),
                        "Multiple sidecars match, using first"
                    );
                    Ok((*first).clone())
                }
            },
        }
    }
}

/// At most one B1 map for the subject within the indexed sessions
fn find_b1_map(
    query: &AcquisitionQuery,
    sessions: &BTreeSet<String>,
    scan: &ScanResult,
) -> Result<Option<PathBuf>> {
    let candidates: Vec<PathBuf> = scan
        .b1_maps
        .iter()
        .filter(|b1| {
            b1.name.subject == query.subject
                && b1
                    .name
                    .session
                    .as_ref()
                    .map_or(true, |s| sessions.contains(s))
        })
        .map(|b1| b1.path.clone())
        .collect();

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.into_iter().next()),
        _ => Err(Error::AmbiguousB1Map(candidates)),
    }
}
