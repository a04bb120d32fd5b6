//! Canvas rendering module
//!
//! Rendering is split in two: `scene` and `hud` turn a [`GameState`] into a
//! [`Frame`] of draw commands without mutating it, and `canvas` replays a
//! frame onto a `CanvasRenderingContext2d` in the browser.
//!
//! [`GameState`]: crate::sim::GameState

pub mod frame;
pub mod hud;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use frame::{Color, DrawCmd, Frame, TextAlign, colors};
pub use scene::{RenderOptions, build_frame};
