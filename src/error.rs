use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type Result<T> = std::result::Result<T, SketchError>;

#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    /// A configuration value or the source raster is unusable. Raised at construction; the
    /// caller has to fix its input and build a new sketch.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The source raster refused an in-bounds lookup in the middle of a run.
    #[error("source raster has no color at ({x}, {y})")]
    SourceUnavailable { x: u32, y: u32 },

    #[error("failed to read or write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image codec error for `{}`", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SketchError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = SketchError::invalid("stroke_reduction", "must be in (0, 1), got 1.5");
        assert_eq!(
            err.to_string(),
            "invalid input `stroke_reduction`: must be in (0, 1), got 1.5"
        );
    }
}
