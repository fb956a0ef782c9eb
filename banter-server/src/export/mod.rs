//! Audio export: merge per-bubble clips into one file

pub mod merge;

pub use merge::{
    AudioMerger, InputOutcome, MergeRequest, MergeSummary, SkipReason, SkippedInput,
    DEFAULT_GAP_MS, MAX_GAP_MS,
};
