//! The chunked codec session layer.
//!
//! Sub-modules:
//! - [`types`] — modes, phases, progress codes, errors, tuning parameters
//! - [`session`] — the feed/drain state machine around the backend codec
//! - [`oneshot`] — bounds-checked single-call compress/decompress
//! - [`pump`] — pull-input / push-output session driving

pub mod oneshot;
pub mod pump;
pub mod session;
pub mod types;

pub use oneshot::{compress_bound, compress_one_shot, decompress_one_shot};
pub use pump::{InputSource, OutputSink, ReadSource, SliceSource, WriteSink};
pub use session::Session;
pub use types::{Mode, Params, Phase, Progress, ZError};
