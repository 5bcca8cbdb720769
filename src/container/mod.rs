//! In-memory container representation: entries plus metadata.
//!
//! The [`Container`] owns an ordered mapping of logical paths to
//! [`Entry`] values and a [`Metadata`] record. It is the single source of
//! truth for the embedded file set; the reader builds one per parse and the
//! writer serializes it back into the host document.

mod entry;
mod metadata;
mod model;

pub use entry::Entry;
pub use metadata::{ESSENTIAL_KEYS, GENERATOR, Metadata, PROTECTED_KEYS};
pub use model::{AddOptions, Container};
