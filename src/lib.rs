#![forbid(unsafe_code)]

pub mod assets;
pub mod bob;
pub mod circle;
pub mod encode_gif;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod preview;
pub mod remove;
pub mod roster;
pub mod sample;

pub use assets::OutputPaths;
pub use bob::{bob_frames, bob_offsets};
pub use circle::{circle_mask, composite_circular};
pub use encode_gif::{GifConfig, default_gif_config, encode_gif};
pub use error::{RoundelError, RoundelResult};
pub use generate::{GenerateOptions, Generator};
pub use pipeline::{BatchSummary, FinishOptions};
pub use preview::PreviewLayout;
pub use remove::{Thresholds, remove_background};
pub use roster::{AgentSpec, Roster, ThemeColor};
pub use sample::sample_border;
