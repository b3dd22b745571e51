//! Paint engine that turns toolkit paint commands into native GPU 2D drawing calls.
//!
//! The host toolkit drives a [`PaintSession`] on a render target: it opens the
//! session with its current [`PainterState`], reports state changes through
//! [`PaintSession::update_state`] with a [`DirtyFlags`] mask, issues draw calls, and
//! closes the session. The [`PaintEngine`] behind the session keeps native brushes,
//! stroke styles and font faces cached and only rebuilds what changed.
//!
//! Render targets own the native context and its surface:
//! - [`BitmapTarget`] draws into an off-screen bitmap,
//! - [`WindowTarget`] draws into a window's swap chain and presents after every paint.
//!
//! Device loss surfaces when a session ends. The target rebuilds itself and the session
//! reports `false`, asking the host for another frame.
//!
//! The native API is abstracted by the traits in [`native`]. The `paintbridge_d2d`
//! crate implements them with Direct2D; [`recording`] implements them by logging the
//! calls.

pub mod brush;
pub mod config;
pub mod engine;
pub mod error;
pub mod font;
pub mod image;
pub mod native;
pub mod path;
pub mod pen;
pub mod recording;
pub mod shapes;
pub mod state;
pub mod target;

pub use brush::{Brush, BrushStyle, ColorStop, ConicalGradient, LinearGradient, RadialGradient};
pub use config::EngineConfig;
pub use engine::PaintEngine;
pub use error::{NativeError, NativeResult};
pub use font::{FontDescription, TextItem};
pub use image::{Image, ImageFormat};
pub use path::{ElementKind, FillRule, Path, PathElement};
pub use pen::{Pen, PenCap, PenJoin, PenStyle};
pub use shapes::{IntLine, IntPoint, IntRect};
pub use state::{CompositionMode, DirtyFlags, PainterState, RenderHints};
pub use target::{
    BitmapProperties, BitmapTarget, PaintDeviceMetric, PaintSession, RenderTarget, WindowEvent, WindowKind,
    WindowTarget,
};

pub use kurbo;
pub use peniko;
