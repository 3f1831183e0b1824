//! The parsed connection configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ParseError;

/// How the driver should treat the host list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConnectMode {
    /// Discover the deployment topology from the seed list
    #[default]
    Automatic,
    /// Talk to a single server directly
    Single,
}

/// Interpretation of the raw `w` write-concern option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteConcernW {
    /// Acknowledgement from this many nodes
    Nodes(u32),
    /// Acknowledgement from a majority of voting nodes
    Majority,
    /// Acknowledgement from nodes matching a custom tag set
    Tag(String),
}

/// A parsed and validated connection string.
///
/// Produced once by [`Parser::parse`](crate::Parser::parse) and immutable
/// afterwards.
///
/// # Examples
///
/// ```
/// use mongo_connstring::ConnectionConfig;
///
/// let config: ConnectionConfig = "mongodb://host1,host2:27017/mydb?replicaSet=rs0&ssl=true"
///     .parse()
///     .unwrap();
/// assert_eq!(config.hosts(), ["host1", "host2:27017"]);
/// assert_eq!(config.database(), "mydb");
/// assert_eq!(config.replica_set(), Some("rs0"));
/// assert!(config.use_tls());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ConnectionConfig {
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub(crate) original: String,
    pub(crate) hosts: Vec<String>,
    pub(crate) using_srv: bool,
    pub(crate) username: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub(crate) password: String,
    pub(crate) password_set: bool,
    pub(crate) database: String,
    pub(crate) connect_mode: ConnectMode,
    pub(crate) use_tls: bool,

    pub(crate) app_name: Option<String>,
    pub(crate) auth_mechanism: Option<String>,
    pub(crate) auth_mechanism_properties: BTreeMap<String, String>,
    pub(crate) auth_source: Option<String>,
    pub(crate) compressors: Vec<String>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) heartbeat_interval: Option<Duration>,
    pub(crate) fsync: Option<bool>,
    pub(crate) journal: Option<bool>,
    pub(crate) gssapi_service_name: Option<String>,
    pub(crate) gssapi_host_name: Option<String>,
    pub(crate) local_threshold: Option<Duration>,
    pub(crate) max_conns_per_host: Option<u32>,
    pub(crate) max_idle_conns_per_host: Option<u32>,
    pub(crate) max_idle_time: Option<Duration>,
    pub(crate) max_lifetime: Option<Duration>,
    pub(crate) read_concern_level: Option<String>,
    pub(crate) read_preference: Option<String>,
    pub(crate) read_preference_tag_sets: Vec<BTreeMap<String, String>>,
    pub(crate) replica_set: Option<String>,
    pub(crate) server_selection_timeout: Option<Duration>,
    pub(crate) socket_timeout: Option<Duration>,
    pub(crate) w: Option<String>,
    pub(crate) wtimeout: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub(crate) wtimeout_ms_seen: bool,

    pub(crate) options: BTreeMap<String, Vec<String>>,
    pub(crate) unknown_options: BTreeMap<String, Vec<String>>,
}

impl ConnectionConfig {
    /// Starts an empty configuration for `original`.
    pub(crate) fn new(original: &str, using_srv: bool) -> Self {
        Self {
            original: original.to_string(),
            hosts: Vec::new(),
            using_srv,
            username: String::new(),
            password: String::new(),
            password_set: false,
            database: String::new(),
            connect_mode: ConnectMode::Automatic,
            use_tls: using_srv,
            app_name: None,
            auth_mechanism: None,
            auth_mechanism_properties: BTreeMap::new(),
            auth_source: None,
            compressors: Vec::new(),
            connect_timeout: None,
            heartbeat_interval: None,
            fsync: None,
            journal: None,
            gssapi_service_name: None,
            gssapi_host_name: None,
            local_threshold: None,
            max_conns_per_host: None,
            max_idle_conns_per_host: None,
            max_idle_time: None,
            max_lifetime: None,
            read_concern_level: None,
            read_preference: None,
            read_preference_tag_sets: Vec::new(),
            replica_set: None,
            server_selection_timeout: None,
            socket_timeout: None,
            w: None,
            wtimeout: None,
            wtimeout_ms_seen: false,
            options: BTreeMap::new(),
            unknown_options: BTreeMap::new(),
        }
    }

    /// Parses a connection string using the default resolver.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the string is not a valid connection string.
    pub fn parse(uri: &str) -> Result<Self, ParseError> {
        crate::parse(uri)
    }

    /// Returns the input string exactly as given.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns the hosts (`host` or `host:port`) in input or SRV order.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Returns true if the `mongodb+srv` scheme was used.
    #[must_use]
    pub const fn using_srv(&self) -> bool {
        self.using_srv
    }

    /// Returns the decoded username, empty if none was given.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the decoded password, or `None` if no `:` separator was given.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password_set.then_some(self.password.as_str())
    }

    /// Returns true if a password (possibly empty) was given.
    #[must_use]
    pub const fn password_set(&self) -> bool {
        self.password_set
    }

    /// Returns the decoded database name, empty if none was given.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the connect mode.
    #[must_use]
    pub const fn connect_mode(&self) -> ConnectMode {
        self.connect_mode
    }

    /// Returns true if connections should use TLS.
    #[must_use]
    pub const fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Returns the application name.
    #[must_use]
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// Returns the authentication mechanism.
    #[must_use]
    pub fn auth_mechanism(&self) -> Option<&str> {
        self.auth_mechanism.as_deref()
    }

    /// Returns the authentication mechanism properties.
    #[must_use]
    pub const fn auth_mechanism_properties(&self) -> &BTreeMap<String, String> {
        &self.auth_mechanism_properties
    }

    /// Returns the authentication database.
    #[must_use]
    pub fn auth_source(&self) -> Option<&str> {
        self.auth_source.as_deref()
    }

    /// Returns the requested wire compressors in preference order.
    #[must_use]
    pub fn compressors(&self) -> &[String] {
        &self.compressors
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Returns the server monitoring heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval
    }

    /// Returns the write-concern `fsync` flag.
    #[must_use]
    pub const fn fsync(&self) -> Option<bool> {
        self.fsync
    }

    /// Returns the write-concern journal (`j`) flag.
    #[must_use]
    pub const fn journal(&self) -> Option<bool> {
        self.journal
    }

    /// Returns the Kerberos service name.
    #[must_use]
    pub fn gssapi_service_name(&self) -> Option<&str> {
        self.gssapi_service_name.as_deref()
    }

    /// Returns the Kerberos service host.
    #[must_use]
    pub fn gssapi_host_name(&self) -> Option<&str> {
        self.gssapi_host_name.as_deref()
    }

    /// Returns the latency window for server selection.
    #[must_use]
    pub const fn local_threshold(&self) -> Option<Duration> {
        self.local_threshold
    }

    /// Returns the maximum connections per host.
    #[must_use]
    pub const fn max_conns_per_host(&self) -> Option<u32> {
        self.max_conns_per_host
    }

    /// Returns true if the maximum connections per host was set.
    #[must_use]
    pub const fn max_conns_per_host_set(&self) -> bool {
        self.max_conns_per_host.is_some()
    }

    /// Returns the maximum idle connections per host.
    #[must_use]
    pub const fn max_idle_conns_per_host(&self) -> Option<u32> {
        self.max_idle_conns_per_host
    }

    /// Returns true if the maximum idle connections per host was set.
    #[must_use]
    pub const fn max_idle_conns_per_host_set(&self) -> bool {
        self.max_idle_conns_per_host.is_some()
    }

    /// Returns how long a connection may sit idle before being closed.
    #[must_use]
    pub const fn max_idle_time(&self) -> Option<Duration> {
        self.max_idle_time
    }

    /// Returns the maximum lifetime of a connection.
    #[must_use]
    pub const fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime
    }

    /// Returns the read concern level.
    #[must_use]
    pub fn read_concern_level(&self) -> Option<&str> {
        self.read_concern_level.as_deref()
    }

    /// Returns the read preference mode.
    #[must_use]
    pub fn read_preference(&self) -> Option<&str> {
        self.read_preference.as_deref()
    }

    /// Returns the read preference tag sets in occurrence order.
    #[must_use]
    pub fn read_preference_tag_sets(&self) -> &[BTreeMap<String, String>] {
        &self.read_preference_tag_sets
    }

    /// Returns the replica set name.
    #[must_use]
    pub fn replica_set(&self) -> Option<&str> {
        self.replica_set.as_deref()
    }

    /// Returns the server selection timeout.
    #[must_use]
    pub const fn server_selection_timeout(&self) -> Option<Duration> {
        self.server_selection_timeout
    }

    /// Returns the socket timeout.
    #[must_use]
    pub const fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout
    }

    /// Returns the raw write-concern `w` value.
    #[must_use]
    pub fn w(&self) -> Option<&str> {
        self.w.as_deref()
    }

    /// Interprets the `w` value as a node count, `majority`, or a tag.
    ///
    /// ```
    /// use mongo_connstring::{ConnectionConfig, WriteConcernW};
    ///
    /// let config = ConnectionConfig::parse("mongodb://h/?w=2").unwrap();
    /// assert_eq!(config.write_concern_w(), Some(WriteConcernW::Nodes(2)));
    ///
    /// let config = ConnectionConfig::parse("mongodb://h/?w=dc1").unwrap();
    /// assert_eq!(config.write_concern_w(), Some(WriteConcernW::Tag("dc1".into())));
    /// ```
    #[must_use]
    pub fn write_concern_w(&self) -> Option<WriteConcernW> {
        let w = self.w.as_deref()?;
        Some(match w.parse::<u32>() {
            Ok(n) => WriteConcernW::Nodes(n),
            Err(_) if w == "majority" => WriteConcernW::Majority,
            Err(_) => WriteConcernW::Tag(w.to_string()),
        })
    }

    /// Returns the write-concern timeout.
    #[must_use]
    pub const fn wtimeout(&self) -> Option<Duration> {
        self.wtimeout
    }

    /// Returns every option pair by lowercased key, values in occurrence order.
    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, Vec<String>> {
        &self.options
    }

    /// Returns the values given for `key`, matched case-insensitively.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&[String]> {
        self.options.get(&key.to_lowercase()).map(Vec::as_slice)
    }

    /// Returns the options that are not recognized, by lowercased key.
    #[must_use]
    pub const fn unknown_options(&self) -> &BTreeMap<String, Vec<String>> {
        &self.unknown_options
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for ConnectionConfig {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ConnectionConfig {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for ConnectionConfig {
    fn as_ref(&self) -> &str {
        &self.original
    }
}
