//! Resolved fitting parameters
//!
//! [`ResolvedParameterSet`] is the only artifact handed to the fitting
//! routine. [`FittingArguments`] is its wire shape, using the key names the
//! fitter expects.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Magnitude + phase images of one inversion/echo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePair {
    pub magnitude: PathBuf,
    pub phase: PathBuf,
}

/// One echo of a multi-echo second inversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoImages {
    pub echo: u32,
    pub echo_time: f64,
    pub images: ImagePair,
}

/// Second inversion images
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SecondInversion {
    SingleEcho(ImagePair),
    /// Ordered by ascending echo index
    MultiEcho(Vec<EchoImages>),
}

impl SecondInversion {
    pub fn is_multi_echo(&self) -> bool {
        matches!(self, SecondInversion::MultiEcho(_))
    }

    /// Echo times aligned with the per-echo image lists
    pub fn echo_times(&self) -> Option<Vec<f64>> {
        match self {
            SecondInversion::SingleEcho(_) => None,
            SecondInversion::MultiEcho(echoes) => {
                Some(echoes.iter().map(|e| e.echo_time).collect())
            }
        }
    }

    fn magnitude_argument(&self) -> PathArgument {
        match self {
            SecondInversion::SingleEcho(pair) => PathArgument::Single(pair.magnitude.clone()),
            SecondInversion::MultiEcho(echoes) => PathArgument::PerEcho(
                echoes.iter().map(|e| e.images.magnitude.clone()).collect(),
            ),
        }
    }

    fn phase_argument(&self) -> PathArgument {
        match self {
            SecondInversion::SingleEcho(pair) => PathArgument::Single(pair.phase.clone()),
            SecondInversion::MultiEcho(echoes) => PathArgument::PerEcho(
                echoes.iter().map(|e| e.images.phase.clone()).collect(),
            ),
        }
    }
}

/// Complete parameter set for one subject/session/acquisition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameterSet {
    pub subject: String,
    pub session: String,
    pub acquisition: String,
    /// MPRAGE repetition time, shared by both inversions
    pub mprage_tr: f64,
    /// `[inv1, inv2]`
    pub inversion_times: [f64; 2],
    /// `[inv1, inv2]`, degrees
    pub flip_angles: [f64; 2],
    /// Excitation (FLASH) repetition times `[inv1, inv2]`
    pub flash_tr: [f64; 2],
    /// Half the number of shots per slab `[inv1, inv2]`
    pub nz_slices: [u32; 2],
    pub inv1: ImagePair,
    pub inv2: SecondInversion,
    pub b1_fieldmap: Option<PathBuf>,
}

impl ResolvedParameterSet {
    pub fn is_multi_echo(&self) -> bool {
        self.inv2.is_multi_echo()
    }

    /// Magnitude image of `inversion` at 1-based `echo`
    pub fn inversion_magnitude(&self, inversion: u32, echo: u32) -> Option<&Path> {
        match (inversion, &self.inv2) {
            (1, _) if echo == 1 => Some(self.inv1.magnitude.as_path()),
            (2, SecondInversion::SingleEcho(pair)) if echo == 1 => Some(pair.magnitude.as_path()),
            (2, SecondInversion::MultiEcho(echoes)) => echoes
                .iter()
                .find(|e| e.echo == echo)
                .map(|e| e.images.magnitude.as_path()),
            _ => None,
        }
    }

    /// Argument mapping consumed by the fitting routine
    pub fn to_fitting_arguments(&self) -> FittingArguments {
        FittingArguments {
            mprage_tr: self.mprage_tr,
            inversion_times: self.inversion_times,
            flip_angles: self.flip_angles,
            flash_tr: self.flash_tr,
            nz_slices: self.nz_slices,
            inv1: self.inv1.magnitude.clone(),
            inv1ph: self.inv1.phase.clone(),
            inv2: self.inv2.magnitude_argument(),
            inv2ph: self.inv2.phase_argument(),
            echo_times: self.inv2.echo_times(),
            b1_fieldmap: self.b1_fieldmap.clone(),
        }
    }
}

/// A single path, or one path per echo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathArgument {
    Single(PathBuf),
    PerEcho(Vec<PathBuf>),
}

/// Fitting routine arguments
///
/// The presence of `echo_times` selects the multi-echo model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittingArguments {
    #[serde(rename = "MPRAGE_tr")]
    pub mprage_tr: f64,
    #[serde(rename = "invtimesAB")]
    pub inversion_times: [f64; 2],
    #[serde(rename = "flipangleABdegree")]
    pub flip_angles: [f64; 2],
    #[serde(rename = "FLASH_tr")]
    pub flash_tr: [f64; 2],
    #[serde(rename = "nZslices")]
    pub nz_slices: [u32; 2],
    pub inv1: PathBuf,
    pub inv1ph: PathBuf,
    pub inv2: PathArgument,
    pub inv2ph: PathArgument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo_times: Option<Vec<f64>>,
    #[serde(rename = "B1_fieldmap", skip_serializing_if = "Option::is_none")]
    pub b1_fieldmap: Option<PathBuf>,
}
