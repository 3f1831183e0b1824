//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use mongo_connstring::prelude::*;
//!
//! let config = ConnectionConfig::parse("mongodb://localhost:27017/test").unwrap();
//! assert_eq!(config.connect_mode(), ConnectMode::Automatic);
//! ```

#[cfg(feature = "system-dns")]
pub use crate::SystemResolver;
pub use crate::{
    // Core types
    ConnectMode, ConnectionConfig, Parser, WriteConcernW,
    // DNS
    DefaultResolver, NoResolver, Resolver, SrvRecord, StaticResolver,
    // Errors
    DecodeError, OptionValueError, ParseError, ParseErrorKind, ResolveError,
    // Constants
    SCHEME, SRV_SCHEME,
};
