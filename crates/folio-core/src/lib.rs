//! Platform-free core of folio's adaptive rendering controller.
//!
//! Everything here is deterministic given its inputs: the browser and native
//! front-ends feed in probe results, timestamps and visibility signals, and
//! read back the quality level and render settings.

pub mod animation;
pub mod battery;
pub mod capabilities;
pub mod clock;
pub mod constants;
pub mod context;
pub mod detect;
pub mod error;
pub mod fps;
pub mod fps_counter;
pub mod observable;
pub mod quality;
pub mod settings;
pub mod storage;

pub use animation::*;
pub use battery::*;
pub use capabilities::*;
pub use clock::*;
pub use context::*;
pub use detect::*;
pub use error::*;
pub use fps::*;
pub use fps_counter::*;
pub use observable::*;
pub use quality::*;
pub use settings::*;
pub use storage::*;
