//! Test Helper Utilities
//!
//! Builds BIDS-style MP2RAGE datasets in a temporary directory

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::{capture_logs, LogCapture};

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary dataset root
pub struct TestDataset {
    dir: TempDir,
}

impl TestDataset {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/sub-<subject>/ses-<session>/<datatype>`
    pub fn datatype_dir(&self, subject: &str, session: &str, datatype: &str) -> PathBuf {
        let dir = self
            .root()
            .join(format!("sub-{}", subject))
            .join(format!("ses-{}", session))
            .join(datatype);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Create an empty image file in the anat folder
    pub fn touch(&self, subject: &str, session: &str, file_name: &str) -> PathBuf {
        let path = self.datatype_dir(subject, session, "anat").join(file_name);
        fs::write(&path, b"").unwrap();
        path
    }

    /// Write a JSON sidecar in the anat folder
    pub fn write_json(&self, subject: &str, session: &str, file_name: &str, value: &Value) -> PathBuf {
        let path = self.datatype_dir(subject, session, "anat").join(file_name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// Single-echo MP2RAGE: mag + phase per inversion, one sidecar per inversion
    pub fn add_mp2rage(&self, subject: &str, session: &str, acquisition: &str, shots: f64) {
        for inversion in 1..=2 {
            let stem = format!(
                "sub-{}_ses-{}_acq-{}_inv-{}",
                subject, session, acquisition, inversion
            );
            self.touch(subject, session, &format!("{}_part-mag_MPRAGE.nii.gz", stem));
            self.touch(subject, session, &format!("{}_part-phase_MPRAGE.nii.gz", stem));
            self.write_json(
                subject,
                session,
                &format!("{}_MPRAGE.json", stem),
                &sidecar(inversion, 1, shots),
            );
        }
    }

    /// ME-MP2RAGE: single-echo inversion 1, `echoes` echoes at inversion 2
    pub fn add_memp2rage(&self, subject: &str, session: &str, acquisition: &str, echoes: u32) {
        let inv1 = format!("sub-{}_ses-{}_acq-{}_inv-1", subject, session, acquisition);
        self.touch(subject, session, &format!("{}_part-mag_MPRAGE.nii.gz", inv1));
        self.touch(subject, session, &format!("{}_part-phase_MPRAGE.nii.gz", inv1));
        self.write_json(subject, session, &format!("{}_MPRAGE.json", inv1), &sidecar(1, 1, 120.0));

        for echo in 1..=echoes {
            let stem = format!(
                "sub-{}_ses-{}_acq-{}_inv-2_echo-{}",
                subject, session, acquisition, echo
            );
            self.touch(subject, session, &format!("{}_part-mag_MPRAGE.nii.gz", stem));
            self.touch(subject, session, &format!("{}_part-phase_MPRAGE.nii.gz", stem));
            self.write_json(
                subject,
                session,
                &format!("{}_MPRAGE.json", stem),
                &sidecar(2, echo, 120.0),
            );
        }
    }

    /// B1 map in the fmap folder
    pub fn add_b1map(&self, subject: &str, session: &str, acquisition: &str) -> PathBuf {
        let path = self
            .datatype_dir(subject, session, "fmap")
            .join(format!("sub-{}_ses-{}_acq-{}_B1map.nii.gz", subject, session, acquisition));
        fs::write(&path, b"").unwrap();
        path
    }

    /// Path of an anat file, without creating it
    pub fn anat_path(&self, subject: &str, session: &str, file_name: &str) -> PathBuf {
        self.datatype_dir(subject, session, "anat").join(file_name)
    }
}

/// Sidecar contents for one inversion/echo
pub fn sidecar(inversion: u32, echo: u32, shots: f64) -> Value {
    let (inversion_time, flip_angle, flash_tr) = match inversion {
        1 => (0.8, 7.0, 0.0062),
        _ => (2.7, 6.0, 0.0320),
    };
    json!({
        "InversionRepetitionTime": 5.0,
        "InversionTime": inversion_time,
        "FlipAngle": flip_angle,
        "ExcitationRepetitionTime": flash_tr,
        "NumberShots": shots,
        "EchoTime": 0.003 * echo as f64,
        "Manufacturer": "Siemens",
    })
}
