//! Constants for connection string parsing.

/// Scheme for a plain seed list connection string.
pub const SCHEME: &str = "mongodb";

/// Scheme for a DNS seed list (SRV) connection string.
pub const SRV_SCHEME: &str = "mongodb+srv";

/// Service name queried in SRV lookups.
pub const SRV_SERVICE: &str = "mongodb";

/// Protocol queried in SRV lookups.
pub const SRV_PROTOCOL: &str = "tcp";

/// Option keys a TXT record may carry (normalized to lowercase).
pub const ALLOWED_TXT_OPTIONS: [&str; 2] = ["authsource", "replicaset"];

/// Smallest valid port number.
pub const MIN_PORT: u16 = 1;

/// Separators between option pairs in a query string or TXT record.
pub(crate) const OPTION_SEPARATORS: [char; 2] = ['&', ';'];
