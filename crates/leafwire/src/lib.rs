//! Top-level facade crate for leafwire.
//!
//! Re-exports the codec core and the processor library so users can depend on a single crate.
//! Records derived through the facade name the core path explicitly:
//!
//! ```
//! use leafwire::core::{Codec, Record};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! #[wire(crate = "leafwire::core")]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! let codec = Codec::default();
//! let bytes = codec.marshal(&Ping { seq: 7 }).unwrap();
//! assert_eq!(codec.unmarshal::<Ping>(&bytes).unwrap(), Ping { seq: 7 });
//! ```

pub mod core {
    pub use leafwire_core::*;
}

pub mod processor {
    pub use leafwire_processor::*;
}

pub use leafwire_core::{Record, WireError};
