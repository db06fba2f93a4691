//! qmri-params library interface
//!
//! Indexes MP2RAGE / ME-MP2RAGE acquisitions in a BIDS-style dataset and
//! resolves the parameter set needed by the quantitative fitting routine.
//!
//! ```no_run
//! use qmri_common::config::IndexConfig;
//! use qmri_params::services::{resolve_acquisition, AcquisitionIndexBuilder, AcquisitionQuery};
//!
//! let builder = AcquisitionIndexBuilder::new("/sourcedata", IndexConfig::default());
//! let query = AcquisitionQuery::new("01", Some("1"), "memp2rage");
//! let params = resolve_acquisition(&builder, &query)?;
//! println!("{}", serde_json::to_string_pretty(&params.to_fitting_arguments()).unwrap());
//! # Ok::<(), qmri_common::Error>(())
//! ```

pub mod models;
pub mod services;

pub use crate::models::{FittingArguments, ResolvedParameterSet, SecondInversion};
pub use crate::services::{resolve_acquisition, resolve_parameters};
