//! Parameter resolver
//!
//! Turns an [`AcquisitionIndex`] into the [`ResolvedParameterSet`] consumed
//! by the fitting routine. Single pass, no retries: a malformed acquisition
//! fails immediately and nothing partial is returned.

use crate::models::metadata::fields;
use crate::models::{EchoImages, ImagePair, MetadataValue, Part, ResolvedParameterSet, SecondInversion};
use crate::services::acquisition_index::{
    AcquisitionIndex, AcquisitionIndexBuilder, AcquisitionQuery, IndexRow,
};
use qmri_common::{Error, Result};

/// Build the index for `query` and resolve it
pub fn resolve_acquisition(
    builder: &AcquisitionIndexBuilder,
    query: &AcquisitionQuery,
) -> Result<ResolvedParameterSet> {
    let index = builder.build(query)?;
    resolve_parameters(&index)
}

/// Resolve the fitting parameters of an indexed acquisition
pub fn resolve_parameters(index: &AcquisitionIndex) -> Result<ResolvedParameterSet> {
    let inv1_mag = index.require(1, 1, Part::Mag)?;
    let inv2_mag = index.require(2, 1, Part::Mag)?;

    let mprage_tr = numeric_field(inv1_mag, fields::INVERSION_REPETITION_TIME)?;
    let inversion_times = [
        numeric_field(inv1_mag, fields::INVERSION_TIME)?,
        numeric_field(inv2_mag, fields::INVERSION_TIME)?,
    ];
    let flip_angles = [
        numeric_field(inv1_mag, fields::FLIP_ANGLE)?,
        numeric_field(inv2_mag, fields::FLIP_ANGLE)?,
    ];
    let flash_tr = [
        numeric_field(inv1_mag, fields::EXCITATION_REPETITION_TIME)?,
        numeric_field(inv2_mag, fields::EXCITATION_REPETITION_TIME)?,
    ];
    let nz_slices = [half_shots(inv1_mag)?, half_shots(inv2_mag)?];

    let inv1 = ImagePair {
        magnitude: inv1_mag.image.path.clone(),
        phase: index.require(1, 1, Part::Phase)?.image.path.clone(),
    };

    let inv2 = if index.is_multi_echo() {
        let mut echoes = Vec::new();
        for mag in index.echoes(2, Part::Mag) {
            let echo = mag.image.echo;
            echoes.push(EchoImages {
                echo,
                echo_time: numeric_field(mag, fields::ECHO_TIME)?,
                images: ImagePair {
                    magnitude: mag.image.path.clone(),
                    phase: index.require(2, echo, Part::Phase)?.image.path.clone(),
                },
            });
        }
        SecondInversion::MultiEcho(echoes)
    } else {
        SecondInversion::SingleEcho(ImagePair {
            magnitude: inv2_mag.image.path.clone(),
            phase: index.require(2, 1, Part::Phase)?.image.path.clone(),
        })
    };

    let query = index.query();
    let params = ResolvedParameterSet {
        subject: query.subject.clone(),
        session: inv1_mag.image.session.clone(),
        acquisition: query.acquisition.clone(),
        mprage_tr,
        inversion_times,
        flip_angles,
        flash_tr,
        nz_slices,
        inv1,
        inv2,
        b1_fieldmap: index.b1_map().map(|p| p.to_path_buf()),
    };

    tracing::info!(
        subject = %params.subject,
        session = %params.session,
        acquisition = %params.acquisition,
        multi_echo = params.is_multi_echo(),
        b1_map = params.b1_fieldmap.is_some(),
        "Resolved MP2RAGE parameters"
    );

    Ok(params)
}

/// Numeric sidecar field of a row
///
/// A list whose elements are all equal counts as that single value.
fn numeric_field(row: &IndexRow, field: &str) -> Result<f64> {
    let path = &row.metadata.path;
    let value = match row.metadata.get(field) {
        Some(MetadataValue::Number(value)) => *value,
        Some(MetadataValue::NumberList(values)) => match values.split_first() {
            Some((first, rest)) if rest.iter().all(|v| v == first) => *first,
            _ => {
                return Err(Error::malformed_metadata(
                    path,
                    format!("{} has differing values {:?}", field, values),
                ))
            }
        },
        Some(other) => {
            return Err(Error::malformed_metadata(
                path,
                format!("{} is not numeric: {:?}", field, other),
            ))
        }
        None => return Err(Error::malformed_metadata(path, format!("missing {}", field))),
    };

    if !value.is_finite() {
        return Err(Error::malformed_metadata(
            path,
            format!("{} is not finite", field),
        ));
    }
    Ok(value)
}

/// Each inversion acquires half the shots per slab
fn half_shots(row: &IndexRow) -> Result<u32> {
    let shots = numeric_field(row, fields::NUMBER_SHOTS)?;
    if shots < 0.0 {
        return Err(Error::malformed_metadata(
            &row.metadata.path,
            format!("{} is negative: {}", fields::NUMBER_SHOTS, shots),
        ));
    }
    let half = (shots * 0.5).floor();
    if half > f64::from(u32::MAX) {
        return Err(Error::malformed_metadata(
            &row.metadata.path,
            format!("{} out of range: {}", fields::NUMBER_SHOTS, shots),
        ));
    }
    Ok(half as u32)
}
