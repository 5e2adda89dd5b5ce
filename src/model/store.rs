//! Model artifact persistence
//!
//! The fitted forest and its ordered feature-column list are one
//! artifact, written and read as a unit. Loading them separately could
//! silently permute feature semantics, so no partial form exists.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use tracing::info;

use crate::error::{ForecastError, Result};

use super::TrainedDemandModel;

/// Write a model artifact as one JSON document, creating parent
/// directories
pub fn save_model<P: AsRef<Path>>(model: &TrainedDemandModel, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, model)?;
    writer.flush()?;

    info!(path = %path.display(), "saved model artifact");
    Ok(())
}

/// Read a model artifact; a missing file is reported as
/// [`ForecastError::ModelNotFound`]
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedDemandModel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ForecastError::ModelNotFound(path.to_path_buf())
        } else {
            ForecastError::Io(e)
        }
    })?;

    let model = serde_json::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), "loaded model artifact");
    Ok(model)
}
