//! Ad decision and placement engine
//!
//! `EngineContext` holds everything that is fixed for the life of the process
//! (configuration and registries). `EngineContext::begin` opens a `RenderSession`
//! for one page render; the session owns every per-request counter and must be
//! flushed once at the end of the render.

pub mod context;
pub mod error;
pub mod session;

pub use context::EngineContext;
pub use error::{EngineError, Result};
pub use session::{RenderSession, Verdict};
