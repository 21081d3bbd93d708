//! Command implementations

pub(crate) mod diseases;
pub(crate) mod predict;
pub(crate) mod symptoms;

use crate::error::Result;
use docrec::config::DocrecConfig;
use docrec::data::Dataset;

/// Loads the three dataset files named by `config`.
pub(crate) fn load_dataset(config: &DocrecConfig) -> Result<Dataset> {
    config.validate()?;
    Ok(Dataset::load(
        &config.symptom_path(),
        &config.specialist_path(),
        &config.description_path(),
    )?)
}
