//! CTF console core types
//!
//! Status model, build log data types, collaborator error type and the
//! traits the build log viewer is written against.

pub mod error;
pub mod source;
pub mod status;
pub mod types;

pub use error::*;
pub use source::*;
pub use status::*;
pub use types::*;
