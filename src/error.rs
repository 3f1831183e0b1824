//! Error types for connection string parsing.

use std::error::Error;
use std::fmt;

/// Errors that can occur when parsing a connection string.
///
/// Every failure is terminal: no partially parsed configuration is ever
/// returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Returns true if the failure came from SRV or TXT discovery.
    #[must_use]
    pub const fn is_srv_error(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::SrvRequiresSingleHost { .. }
                | ParseErrorKind::SrvHostHasPort { .. }
                | ParseErrorKind::SrvLookupFailed { .. }
                | ParseErrorKind::InsufficientSrvLabels { .. }
                | ParseErrorKind::SrvDomainMismatch { .. }
                | ParseErrorKind::MultipleTxtRecords { .. }
                | ParseErrorKind::DisallowedTxtOption { .. }
        )
    }

    /// Returns true if the input does not follow the connection string grammar.
    #[must_use]
    pub const fn is_syntax_error(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::InvalidScheme { .. }
                | ParseErrorKind::UnescapedAt
                | ParseErrorKind::MissingPathSeparator
                | ParseErrorKind::MissingDatabaseSeparator
                | ParseErrorKind::MissingQuerySeparator
                | ParseErrorKind::InvalidOptionSyntax { .. }
        )
    }
}

/// Specific parsing error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Scheme is neither `mongodb://` nor `mongodb+srv://`
    InvalidScheme {
        /// The scheme that was found, if any
        found: Option<String>,
    },
    /// An `@` appears in the host list
    UnescapedAt,
    /// A `?` appears before any `/` following the host list
    MissingPathSeparator,
    /// The host list is followed by something other than `/`
    MissingDatabaseSeparator,
    /// The database is followed by something other than `?`
    MissingQuerySeparator,
    /// An option pair has no `=` or an empty key
    InvalidOptionSyntax {
        /// The offending pair
        pair: String,
    },
    /// A host token could not be percent-decoded
    InvalidHost {
        /// The raw host token
        host: String,
        /// The decoding failure
        source: DecodeError,
    },
    /// A host token cannot be split into host and port
    MalformedHost {
        /// The decoded host token
        host: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// The username or password could not be percent-decoded
    InvalidCredential {
        /// Which credential part failed (`username` or `password`)
        field: &'static str,
        /// The decoding failure
        source: DecodeError,
    },
    /// The database name could not be percent-decoded
    InvalidDatabase {
        /// The raw database segment
        database: String,
        /// The decoding failure
        source: DecodeError,
    },
    /// An option key could not be percent-decoded
    InvalidOptionKey {
        /// The raw key
        key: String,
        /// The decoding failure
        source: DecodeError,
    },
    /// An option value could not be decoded or coerced to its type
    InvalidOptionValue {
        /// The option key as written
        key: String,
        /// The offending value
        value: String,
        /// Reason for invalidity
        reason: OptionValueError,
    },
    /// The username contains an unescaped `/`
    UnescapedSlashInUsername,
    /// The password contains an unescaped `:` or `/`
    UnescapedColonOrSlashInPassword,
    /// A host port is not an integer in `[1, 65535]`
    InvalidPort {
        /// The host token carrying the port
        host: String,
        /// The offending port text
        port: String,
    },
    /// No host was given
    NoHosts,
    /// A `mongodb+srv` URI lists more than one host
    SrvRequiresSingleHost {
        /// Number of hosts given
        count: usize,
    },
    /// A `mongodb+srv` seed hostname carries a port
    SrvHostHasPort {
        /// The seed hostname
        host: String,
    },
    /// The SRV lookup failed
    SrvLookupFailed {
        /// The seed hostname
        host: String,
        /// The resolver failure
        source: ResolveError,
    },
    /// An SRV target has fewer than two DNS labels
    InsufficientSrvLabels {
        /// The SRV target
        target: String,
    },
    /// An SRV target is outside the seed's parent domain
    SrvDomainMismatch {
        /// The SRV target
        target: String,
        /// The parent domain of the seed hostname
        domain: String,
    },
    /// More than one TXT record was returned for the seed
    MultipleTxtRecords {
        /// The seed hostname
        host: String,
        /// Number of records returned
        count: usize,
    },
    /// A TXT record carries an option outside the allow-list
    DisallowedTxtOption {
        /// The key as written in the record
        key: String,
    },
}

impl ParseErrorKind {
    fn source_error(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidHost { source, .. }
            | Self::InvalidCredential { source, .. }
            | Self::InvalidDatabase { source, .. }
            | Self::InvalidOptionKey { source, .. } => Some(source),
            Self::InvalidOptionValue { reason, .. } => Some(reason),
            Self::SrvLookupFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse connection string '{}': ", self.input)?;
        match &self.kind {
            ParseErrorKind::InvalidScheme { found } => match found {
                Some(s) => write!(
                    f,
                    "scheme must be \"mongodb\" or \"mongodb+srv\", found '{s}'"
                ),
                None => write!(
                    f,
                    "missing scheme; URI must start with 'mongodb://' or 'mongodb+srv://'"
                ),
            },
            ParseErrorKind::UnescapedAt => write!(f, "unescaped @ sign in user info"),
            ParseErrorKind::MissingPathSeparator => {
                write!(f, "must have a / before the query ?")
            }
            ParseErrorKind::MissingDatabaseSeparator => {
                write!(f, "must have a / separator between hosts and path")
            }
            ParseErrorKind::MissingQuerySeparator => {
                write!(f, "must have a ? separator between path and query")
            }
            ParseErrorKind::InvalidOptionSyntax { pair } => {
                write!(f, "invalid option '{pair}'; expected key=value")
            }
            ParseErrorKind::InvalidHost { host, source } => {
                write!(f, "invalid host '{host}': {source}")
            }
            ParseErrorKind::MalformedHost { host, reason } => {
                write!(f, "invalid host '{host}': {reason}")
            }
            ParseErrorKind::InvalidCredential { field, source } => {
                write!(f, "invalid {field}: {source}")
            }
            ParseErrorKind::InvalidDatabase { database, source } => {
                write!(f, "invalid database '{database}': {source}")
            }
            ParseErrorKind::InvalidOptionKey { key, source } => {
                write!(f, "invalid option key '{key}': {source}")
            }
            ParseErrorKind::InvalidOptionValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for option '{key}': {reason}")
            }
            ParseErrorKind::UnescapedSlashInUsername => {
                write!(f, "unescaped slash in username")
            }
            ParseErrorKind::UnescapedColonOrSlashInPassword => {
                write!(f, "unescaped colon or slash in password")
            }
            ParseErrorKind::InvalidPort { host, port } => {
                write!(
                    f,
                    "invalid port '{port}' in host '{host}'; port must be in the range [1, 65535]"
                )
            }
            ParseErrorKind::NoHosts => write!(f, "must have at least 1 host"),
            ParseErrorKind::SrvRequiresSingleHost { count } => {
                write!(
                    f,
                    "URI with SRV must include one and only one hostname, found {count}"
                )
            }
            ParseErrorKind::SrvHostHasPort { host } => {
                write!(f, "URI with SRV must not include a port number, found '{host}'")
            }
            ParseErrorKind::SrvLookupFailed { host, source } => {
                write!(f, "SRV lookup for '{host}' failed: {source}")
            }
            ParseErrorKind::InsufficientSrvLabels { target } => {
                write!(f, "SRV target '{target}' must contain at least 2 labels")
            }
            ParseErrorKind::SrvDomainMismatch { target, domain } => {
                write!(
                    f,
                    "domain suffix of SRV target '{target}' does not match seed domain '{domain}'"
                )
            }
            ParseErrorKind::MultipleTxtRecords { host, count } => {
                write!(
                    f,
                    "TXT lookup for '{host}' returned {count} records; at most one is supported"
                )
            }
            ParseErrorKind::DisallowedTxtOption { key } => {
                write!(
                    f,
                    "cannot specify option '{key}' in TXT record; only authSource and replicaSet are allowed"
                )
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source_error()
    }
}

/// Errors for percent-decoding a URI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A `%` is not followed by two hexadecimal digits
    MalformedEscape {
        /// Byte offset of the `%` in the component
        position: usize,
    },
    /// The decoded bytes are not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEscape { position } => {
                write!(
                    f,
                    "malformed percent escape at position {position}; '%' must be followed by two hex digits"
                )
            }
            Self::InvalidUtf8 => write!(f, "percent-decoded bytes are not valid UTF-8"),
        }
    }
}

impl Error for DecodeError {}

/// Reasons an option value is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValueError {
    /// The value could not be percent-decoded
    Decode(DecodeError),
    /// The value is not a recognized boolean token
    NotBoolean,
    /// The value is not a non-negative integer
    NotNonNegativeInteger,
    /// The value does not fit the option's integer type
    OutOfRange {
        /// Largest accepted value
        max: u64,
    },
    /// The value is not a known `connect` mode
    UnknownConnectMode,
    /// A list item does not have the expected shape
    MalformedItem {
        /// The offending item
        item: String,
        /// Expected shape of each item
        expected: &'static str,
    },
}

impl fmt::Display for OptionValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "{e}"),
            Self::NotBoolean => write!(f, "expected a boolean (true/false)"),
            Self::NotNonNegativeInteger => write!(f, "expected a non-negative integer"),
            Self::OutOfRange { max } => write!(f, "value exceeds maximum {max}"),
            Self::UnknownConnectMode => {
                write!(f, "expected one of auto, automatic, direct, single")
            }
            Self::MalformedItem { item, expected } => {
                write!(f, "malformed item '{item}'; expected {expected}")
            }
        }
    }
}

impl Error for OptionValueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors reported by a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The name has no records of the requested type
    NoRecords {
        /// The queried name
        name: String,
    },
    /// The lookup itself failed (transport, timeout, configuration)
    Lookup {
        /// The queried name
        name: String,
        /// Description of the failure
        message: String,
    },
}

impl ResolveError {
    /// Creates a `NoRecords` error.
    #[must_use]
    pub fn no_records(name: impl Into<String>) -> Self {
        Self::NoRecords { name: name.into() }
    }

    /// Creates a `Lookup` error.
    #[must_use]
    pub fn lookup(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecords { name } => write!(f, "no records found for '{name}'"),
            Self::Lookup { name, message } => write!(f, "lookup of '{name}' failed: {message}"),
        }
    }
}

impl Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_input() {
        let err = ParseError {
            input: "mongodb://".to_string(),
            kind: ParseErrorKind::NoHosts,
        };
        assert_eq!(
            err.to_string(),
            "failed to parse connection string 'mongodb://': must have at least 1 host"
        );
    }

    #[test]
    fn source_chains_to_decode_error() {
        let err = ParseError {
            input: "mongodb://h%zz".to_string(),
            kind: ParseErrorKind::InvalidHost {
                host: "h%zz".to_string(),
                source: DecodeError::MalformedEscape { position: 1 },
            },
        };
        let source = err.source().unwrap();
        assert!(source.to_string().contains("position 1"));
    }

    #[test]
    fn classification_helpers() {
        let srv = ParseError {
            input: String::new(),
            kind: ParseErrorKind::SrvRequiresSingleHost { count: 2 },
        };
        assert!(srv.is_srv_error());
        assert!(!srv.is_syntax_error());

        let syntax = ParseError {
            input: String::new(),
            kind: ParseErrorKind::UnescapedAt,
        };
        assert!(syntax.is_syntax_error());
        assert!(!syntax.is_srv_error());
    }
}
