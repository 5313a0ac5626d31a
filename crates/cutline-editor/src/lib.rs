//! Cutline Editor - Editing session
//!
//! [`EditorSession`] is the context object every editor operation goes
//! through. It owns the element model, the playhead clock, the animation
//! scheduler and the playback driver, and keeps the render surface and the
//! backing media elements in step with them.
//!
//! - `session`: refresh, time updates, seek and playback
//! - `editing`: model mutations, selection and the clipboard operations
//! - `elements`: element constructors, styling, animations and transform
//!   write-back

pub mod editing;
pub mod elements;
pub mod session;

pub use editing::ClipboardEntry;
pub use session::EditorSession;

/// Placement offset applied to pasted and split-off elements.
pub const PASTE_OFFSET: (f64, f64) = (50.0, 20.0);

/// Shortest element that `split` accepts (ms).
pub const MIN_SPLIT_DURATION_MS: f64 = 2000.0;
