use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open dataset '{}' ({msg})", .path.display())]
    DatasetOpen { path: PathBuf, msg: String },
    #[error("Spatial reference resolution failed: {0}")]
    ReferenceResolution(String),
    #[error("Failed to transform coordinate ({x}, {y}) of {}: {msg}", feature_label(.feature))]
    Transform {
        feature: Option<u64>,
        x: f64,
        y: f64,
        msg: String,
    },
    #[error("Schema mismatch on field '{field}': {msg}")]
    SchemaMismatch { field: String, msg: String },
    #[error("Failed to write '{}' ({msg})", .path.display())]
    Write { path: PathBuf, msg: String },
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("GDAL error: {0}")]
    GdalError(#[from] gdal::errors::GdalError),
}

impl Error {
    /// Attach the identity of the feature being processed to a transform error
    pub fn with_feature(self, fid: Option<u64>) -> Self {
        match self {
            Error::Transform { feature: None, x, y, msg } => Error::Transform {
                feature: fid,
                x,
                y,
                msg,
            },
            err => err,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Write {
            path: path.into(),
            msg: err.to_string(),
        }
    }
}

fn feature_label(feature: &Option<u64>) -> String {
    match feature {
        Some(fid) => format!("feature {fid}"),
        None => "unknown feature".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_error_carries_feature_identity() {
        let err = Error::Transform {
            feature: None,
            x: 1.5,
            y: 100.0,
            msg: "latitude out of range".into(),
        }
        .with_feature(Some(7));

        assert!(matches!(err, Error::Transform { feature: Some(7), .. }));
        assert_eq!(
            err.to_string(),
            "Failed to transform coordinate (1.5, 100) of feature 7: latitude out of range"
        );
    }

    #[test]
    fn with_feature_keeps_existing_identity() {
        let err = Error::Transform {
            feature: Some(3),
            x: 0.0,
            y: 0.0,
            msg: String::new(),
        }
        .with_feature(Some(9));

        assert!(matches!(err, Error::Transform { feature: Some(3), .. }));
    }

    #[test]
    fn with_feature_ignores_other_errors() {
        let err = Error::Runtime("boom".into()).with_feature(Some(1));
        assert!(matches!(err, Error::Runtime(_)));
    }
}
