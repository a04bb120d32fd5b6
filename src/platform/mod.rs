//! Platform layer
//!
//! Browser glue lives in `web`: canvas sizing, pointer and click listeners,
//! animation-frame scheduling, DOM glyph targets and teardown. Native builds
//! drive [`crate::GameSession`] directly and need nothing from here.

#[cfg(target_arch = "wasm32")]
pub mod web;
