pub mod candle;
pub mod moving_average;
pub mod primitives;
pub mod time;
pub mod types;

pub use candle::{Candle, CandleSeries, RawCandle, RejectedCandle};
pub use moving_average::moving_average;
pub use time::{CanonicalTime, TimeInput, Timeline, normalize_time};
pub use types::{SeriesPoint, Viewport};
