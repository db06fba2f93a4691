//! qmri-params - MP2RAGE parameter resolution driver
//!
//! Resolves the fitting parameters of every configured subject and prints
//! them as one JSON object keyed by subject. A failing subject is logged
//! and skipped; the exit status reports whether any subject failed.

use anyhow::{Context, Result};
use qmri_common::config::ConfigResolver;
use qmri_params::services::{resolve_parameters, AcquisitionIndexBuilder, AcquisitionQuery};
use serde_json::{Map, Value};
use tracing::{error, info};

fn main() -> Result<()> {
    let config = ConfigResolver::new("qmri")
        .resolve()
        .context("Failed to load configuration")?;

    qmri_common::logging::init_tracing(&config.logging)
        .context("Failed to initialise logging")?;

    info!("Starting qmri-params");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Sourcedata: {}", config.sourcedata.display());
    info!("Derivatives: {}", config.derivatives.display());

    if config.subjects.is_empty() {
        anyhow::bail!("No subjects configured");
    }

    let builder = AcquisitionIndexBuilder::new(&config.sourcedata, config.index.clone());
    let scan = builder
        .scan()
        .with_context(|| format!("Failed to scan {}", config.sourcedata.display()))?;

    let mut resolved = Map::new();
    let mut failures = 0usize;
    for subject in &config.subjects {
        let query = AcquisitionQuery::new(subject, config.session.as_deref(), &config.acquisition);
        let result = builder
            .build_from_scan(&query, &scan)
            .and_then(|index| resolve_parameters(&index));
        match result {
            Ok(params) => {
                let arguments = serde_json::to_value(params.to_fitting_arguments())
                    .with_context(|| format!("Failed to serialise parameters of sub-{}", subject))?;
                resolved.insert(subject.clone(), arguments);
            }
            Err(e) => {
                error!(subject = %subject, kind = ?e.kind(), "Parameter resolution failed: {}", e);
                failures += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(resolved))?);

    if failures > 0 {
        anyhow::bail!("{} of {} subjects failed", failures, config.subjects.len());
    }
    Ok(())
}
