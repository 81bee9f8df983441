//! Network weight persistence through Burn recorders.

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{BinFileRecorder, FullPrecisionSettings, PrettyJsonFileRecorder, Recorder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ModelError, Result};

/// Checkpoint file formats.
///
/// # Example
///
/// ```
/// use policy_models::CheckpointFormat;
///
/// assert_eq!(CheckpointFormat::from_extension("bin"), Some(CheckpointFormat::Binary));
/// assert_eq!(CheckpointFormat::from_extension("onnx"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckpointFormat {
    /// Full-precision binary (`.bin`).
    #[default]
    Binary,
    /// Pretty JSON (`.json`), for inspection.
    Json,
}

impl CheckpointFormat {
    /// Format for a file extension, case-insensitive.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "bin" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Format implied by a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Extension written by [`save_checkpoint`].
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for CheckpointFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Json => "json",
        })
    }
}

/// Saves network weights next to `stem`, adding the format's extension.
///
/// Returns the written path.
///
/// # Errors
///
/// Returns [`ModelError::SaveCheckpoint`] if the recorder fails.
pub fn save_checkpoint<B, M>(
    model: &M,
    stem: impl AsRef<Path>,
    format: CheckpointFormat,
) -> Result<PathBuf>
where
    B: Backend,
    M: Module<B>,
{
    let path = stem.as_ref().with_extension(format.extension());
    let record = model.clone().into_record();
    let shown = path.display().to_string();

    match format {
        CheckpointFormat::Binary => {
            let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
            Recorder::<B>::record(&recorder, record, path.clone())
                .map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;
        }
        CheckpointFormat::Json => {
            let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
            Recorder::<B>::record(&recorder, record, path.clone())
                .map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;
        }
    }

    info!(path = %shown, %format, "saved checkpoint");
    Ok(path)
}

/// Loads weights into `model` from a `.bin` or `.json` checkpoint.
///
/// # Errors
///
/// - [`ModelError::CheckpointNotFound`] if the file does not exist
/// - [`ModelError::UnsupportedFormat`] for an unknown extension
/// - [`ModelError::LoadCheckpoint`] if the record does not fit the model
pub fn load_checkpoint<B, M>(model: M, path: impl AsRef<Path>, device: &B::Device) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let path = path.as_ref();
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ModelError::CheckpointNotFound(shown));
    }
    let format = CheckpointFormat::from_path(path)
        .ok_or_else(|| ModelError::UnsupportedFormat(shown.clone()))?;

    let loaded = match format {
        CheckpointFormat::Binary => {
            let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
            model.load_file(path, &recorder, device)
        }
        CheckpointFormat::Json => {
            let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
            model.load_file(path, &recorder, device)
        }
    }
    .map_err(|e| ModelError::load_checkpoint(&shown, e.to_string()))?;

    info!(path = %shown, %format, "loaded checkpoint");
    Ok(loaded)
}
