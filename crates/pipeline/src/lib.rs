//! StoryClip Pipeline
//!
//! Post-processing pipeline that turns a raw recording plus a frozen
//! overlay snapshot into a finished, gallery-saved clip.
//!
//! # Stage Chain
//!
//! ```text
//! recording.mp4 ──► Trim (stream copy) ──► Mute (drop audio) ──┐
//!                                                              │
//! overlay snapshot ──► drawtext filters ──► Overlay Burn-in ◄──┘
//!                                                 │
//!                            (burn failure falls back to muted clip)
//!                                                 │
//!                                  ┌──────────────┴─────┐
//!                                  ▼                    ▼
//!                              Thumbnail          Gallery Save
//!                            (best effort)       (album + URI)
//! ```
//!
//! Every stage output is verified on disk before the chain advances;
//! the tool's exit status alone is never trusted.

pub mod executor;
pub mod ffmpeg;
pub mod filter;
pub mod gallery;
pub mod job;
pub mod scratch;
pub mod verify;

pub use executor::{ClipExecutor, Invocation};
pub use ffmpeg::FfmpegExecutor;
pub use gallery::{DirectoryGallery, Gallery, SavedAsset};
pub use job::{
    Pipeline, PipelineJob, PipelineOptions, PipelineOutcome, StageName, StageReport, TrimParams,
};
pub use verify::MIN_PLAUSIBLE_OUTPUT_BYTES;
