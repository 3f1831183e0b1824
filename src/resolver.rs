//! DNS capability used for `mongodb+srv` seed list discovery.

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{SRV_PROTOCOL, SRV_SERVICE};
use crate::error::ResolveError;

/// One SRV answer: a target host and the port to reach it on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvRecord {
    /// Target hostname, possibly with a trailing `.`
    pub target: String,
    /// Target port
    pub port: u16,
}

impl SrvRecord {
    /// Creates an SRV record.
    #[must_use]
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
        }
    }
}

/// DNS lookups needed to expand a `mongodb+srv` seed.
///
/// Lookups are blocking and carry no timeout or retry of their own;
/// implementations that need bounded latency must impose it themselves.
pub trait Resolver {
    /// Resolves the SRV records for `_<service>._<protocol>.<name>`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the lookup fails or yields no records.
    fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        name: &str,
    ) -> Result<Vec<SrvRecord>, ResolveError>;

    /// Resolves the TXT records for `name`, one string per record.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the lookup fails.
    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        name: &str,
    ) -> Result<Vec<SrvRecord>, ResolveError> {
        (**self).lookup_srv(service, protocol, name)
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        (**self).lookup_txt(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        name: &str,
    ) -> Result<Vec<SrvRecord>, ResolveError> {
        (**self).lookup_srv(service, protocol, name)
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        (**self).lookup_txt(name)
    }
}

/// Builds the DNS query name for an SRV lookup.
#[must_use]
pub fn srv_query_name(service: &str, protocol: &str, name: &str) -> String {
    format!("_{service}._{protocol}.{name}")
}

/// In-memory resolver answering from fixed tables.
///
/// Names are matched case-insensitively. Unknown names yield
/// [`ResolveError::NoRecords`].
///
/// # Examples
///
/// ```
/// use mongo_connstring::{Parser, SrvRecord, StaticResolver};
///
/// let resolver = StaticResolver::new()
///     .with_srv(
///         "cluster0.example.com",
///         vec![SrvRecord::new("node1.example.com.", 27017)],
///     )
///     .with_txt("cluster0.example.com", "replicaSet=rs0");
///
/// let config = Parser::new(resolver)
///     .parse("mongodb+srv://cluster0.example.com/")
///     .unwrap();
/// assert_eq!(config.hosts(), ["node1.example.com:27017"]);
/// assert_eq!(config.replica_set(), Some("rs0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    srv: HashMap<String, Vec<SrvRecord>>,
    txt: HashMap<String, Vec<String>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the SRV answer for `_mongodb._tcp.<name>`.
    #[must_use]
    pub fn with_srv(mut self, name: &str, records: Vec<SrvRecord>) -> Self {
        let query = srv_query_name(SRV_SERVICE, SRV_PROTOCOL, name);
        self.srv.insert(query.to_lowercase(), records);
        self
    }

    /// Adds one TXT record for `name`.
    ///
    /// Calling this twice for the same name yields two records.
    #[must_use]
    pub fn with_txt(mut self, name: &str, record: impl Into<String>) -> Self {
        self.txt
            .entry(name.to_lowercase())
            .or_default()
            .push(record.into());
        self
    }
}

impl Resolver for StaticResolver {
    fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        name: &str,
    ) -> Result<Vec<SrvRecord>, ResolveError> {
        let query = srv_query_name(service, protocol, name);
        match self.srv.get(&query.to_lowercase()) {
            Some(records) if !records.is_empty() => Ok(records.clone()),
            _ => Err(ResolveError::no_records(query)),
        }
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        self.txt
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ResolveError::no_records(name))
    }
}

/// Resolver that fails every lookup.
///
/// Used when no DNS capability is configured; plain `mongodb://` URIs
/// never touch the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn lookup_srv(
        &self,
        service: &str,
        protocol: &str,
        name: &str,
    ) -> Result<Vec<SrvRecord>, ResolveError> {
        Err(ResolveError::lookup(
            srv_query_name(service, protocol, name),
            "no DNS resolver configured",
        ))
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        Err(ResolveError::lookup(name, "no DNS resolver configured"))
    }
}

#[cfg(feature = "system-dns")]
pub use system::SystemResolver;

/// Resolver used by [`parse`](crate::parse) and `Parser::default()`.
#[cfg(feature = "system-dns")]
pub type DefaultResolver = SystemResolver;

/// Resolver used by [`parse`](crate::parse) and `Parser::default()`.
#[cfg(not(feature = "system-dns"))]
pub type DefaultResolver = NoResolver;

#[cfg(feature = "system-dns")]
mod system {
    use hickory_resolver::Resolver as HickoryResolver;
    use hickory_resolver::error::{ResolveError as HickoryError, ResolveErrorKind};

    use super::{Resolver, SrvRecord, srv_query_name};
    use crate::error::ResolveError;

    /// Resolver backed by the operating system's DNS configuration.
    ///
    /// A fresh blocking resolver is built for every lookup; answers are
    /// never cached between parses.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemResolver;

    impl SystemResolver {
        fn resolver(name: &str) -> Result<HickoryResolver, ResolveError> {
            HickoryResolver::from_system_conf()
                .map_err(|e| ResolveError::lookup(name, e.to_string()))
        }
    }

    fn convert(name: &str, error: &HickoryError) -> ResolveError {
        match error.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => ResolveError::no_records(name),
            _ => ResolveError::lookup(name, error.to_string()),
        }
    }

    impl Resolver for SystemResolver {
        fn lookup_srv(
            &self,
            service: &str,
            protocol: &str,
            name: &str,
        ) -> Result<Vec<SrvRecord>, ResolveError> {
            let query = srv_query_name(service, protocol, name);
            let lookup = Self::resolver(&query)?
                .srv_lookup(query.as_str())
                .map_err(|e| convert(&query, &e))?;
            Ok(lookup
                .iter()
                .map(|srv| SrvRecord::new(srv.target().to_utf8(), srv.port()))
                .collect())
        }

        fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
            let lookup = Self::resolver(name)?
                .txt_lookup(name)
                .map_err(|e| convert(name, &e))?;
            Ok(lookup
                .iter()
                .map(|txt| {
                    txt.txt_data()
                        .iter()
                        .map(|chunk| String::from_utf8_lossy(chunk))
                        .collect::<String>()
                })
                .collect())
        }
    }
}
