//! Fitting routine boundary
//!
//! The quantitative fit itself is external. This module picks the model
//! variant, hands over [`FittingArguments`], and selects named outputs.

use crate::models::FittingArguments;
use qmri_common::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Outputs requested from a single-echo fit
pub const MP2RAGE_OUTPUTS: [&str; 2] = ["t1w_uni", "t1map"];

/// Extra maps requested from a multi-echo fit
pub const MEMP2RAGE_OUTPUTS: [&str; 3] = ["S0map", "t2starw", "t2starmap"];

/// Model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitModel {
    Mp2rage,
    Memp2rage,
}

impl FitModel {
    /// Multi-echo iff echo times are present
    pub fn for_arguments(arguments: &FittingArguments) -> Self {
        if arguments.echo_times.is_some() {
            FitModel::Memp2rage
        } else {
            FitModel::Mp2rage
        }
    }
}

/// Named images written by a fit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitOutputs {
    files: BTreeMap<String, PathBuf>,
}

impl FitOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.files.insert(name.to_string(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }

    /// Paths for `names`, in the order requested
    pub fn select(&self, names: &[&str]) -> Result<Vec<PathBuf>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .map(Path::to_path_buf)
                    .ok_or_else(|| Error::FitOutputNotFound(name.to_string()))
            })
            .collect()
    }
}

impl FromIterator<(String, PathBuf)> for FitOutputs {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Wraps the external quantitative fitting routine
pub trait QuantitativeFitter {
    fn fit(
        &self,
        model: FitModel,
        arguments: &FittingArguments,
        output_dir: &Path,
    ) -> Result<FitOutputs>;
}

/// Run `fitter` with the model implied by `arguments` and pick `return_images`
pub fn run_fit<F: QuantitativeFitter + ?Sized>(
    fitter: &F,
    arguments: &FittingArguments,
    output_dir: &Path,
    return_images: &[&str],
) -> Result<Vec<PathBuf>> {
    let model = FitModel::for_arguments(arguments);
    tracing::debug!(?model, output_dir = %output_dir.display(), "Running quantitative fit");
    let outputs = fitter.fit(model, arguments, output_dir)?;
    outputs.select(return_images)
}
