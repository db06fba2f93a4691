//! Data models for qmri-params

pub mod acquisition;
pub mod metadata;
pub mod parameters;

pub use acquisition::{FileExtension, ImageFileRecord, IndexKey, ParsedFilename, Part, SidecarKey};
pub use metadata::{MetadataRecord, MetadataValue};
pub use parameters::{
    EchoImages, FittingArguments, ImagePair, PathArgument, ResolvedParameterSet, SecondInversion,
};
