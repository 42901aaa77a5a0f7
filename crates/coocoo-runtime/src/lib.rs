//! Coocoo image runtime.
//!
//! Backs the intrinsic imports of a compiled module and reads its outputs
//! back once `main` has run:
//!
//! ```text
//! add_image → compile → run main (intrinsics mutate the store) → collect
//! ```
//!
//! With the `host` feature (on by default) [`Session`] executes modules on
//! wasmi. Browser builds turn it off and let the JS engine run the module.

pub mod error;
pub mod export;
pub mod intrinsics;
pub mod store;

#[cfg(feature = "host")]
mod host;

pub use error::{RuntimeError, RuntimeResult};
pub use export::{collect, export, read_slot, ExportedImages, TEXTURES};
pub use intrinsics::dispatch;
pub use store::{ImageData, ImageStore, StoreConfig};

#[cfg(feature = "host")]
pub use host::Session;
