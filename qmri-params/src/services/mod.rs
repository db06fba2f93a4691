//! Service modules for MP2RAGE parameter resolution
//!
//! Scanning and parsing feed the acquisition index; the resolver queries it.

pub mod acquisition_index;
pub mod derivative_lookup;
pub mod file_scanner;
pub mod filename_parser;
pub mod fitting;
pub mod parameter_resolver;
pub mod sidecar_reader;

pub use acquisition_index::{AcquisitionIndex, AcquisitionIndexBuilder, AcquisitionQuery, IndexRow};
pub use derivative_lookup::{DerivativeLookup, DerivativeQuery};
pub use file_scanner::{FileScanner, ScanResult};
pub use filename_parser::{parse_mprage_filename, MPRAGE_SUFFIX};
pub use fitting::{run_fit, FitModel, FitOutputs, QuantitativeFitter};
pub use parameter_resolver::{resolve_acquisition, resolve_parameters};
pub use sidecar_reader::read_sidecar;
