use thiserror::Error;

use crate::render::SurfaceSeriesId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unparsable time `{raw}`: {reason}")]
    InvalidTime { raw: String, reason: String },

    #[error("surface does not know series {0:?}")]
    UnknownSeries(SurfaceSeriesId),

    #[error("surface failure: {0}")]
    Surface(String),
}
