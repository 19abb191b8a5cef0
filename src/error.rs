use thiserror::Error;

/// Library error type for status-bar style analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// The region of interest has a negative width or height.
    #[error("invalid region ({left}, {top}, {right}, {bottom}): width and height must be non-negative")]
    InvalidRegion {
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
    },

    /// An analysis parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The color quantizer failed; its error is passed through untouched.
    #[error("color quantization failed: {0}")]
    Quantizer(anyhow::Error),

    /// Downsampling the region before quantization failed.
    #[error("region downsample failed: {0:#}")]
    Downsample(anyhow::Error),

    /// The blocking analysis worker did not complete.
    #[error("analysis worker failed: {0}")]
    Worker(String),

    /// A path handed to the image scanner does not exist.
    #[error("invalid image path: {0}")]
    BadPath(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_and_quantizer_failures_are_distinguishable() {
        let resize = Error::Downsample(anyhow::anyhow!("buffer too small"));
        let palette = Error::Quantizer(anyhow::anyhow!("backend down"));
        assert_eq!(resize.to_string(), "region downsample failed: buffer too small");
        assert_eq!(palette.to_string(), "color quantization failed: backend down");
    }
}
