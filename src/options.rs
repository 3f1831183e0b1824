//! Connection option parsing.
//!
//! Each recognized key maps to a [`Rule`] describing how its value is
//! coerced and which field it lands in. Scalar fields follow last-write-wins;
//! `wtimeoutMS` is the one exception, taking precedence over `wtimeout`
//! regardless of order.

use std::collections::BTreeMap;
use std::num::IntErrorKind;
use std::time::Duration;

use tracing::trace;

use crate::config::{ConnectMode, ConnectionConfig};
use crate::constants::OPTION_SEPARATORS;
use crate::decode::percent_decode;
use crate::error::{OptionValueError, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    AppName,
    AuthMechanism,
    AuthSource,
    GssapiServiceName,
    GssapiHostName,
    ReadConcernLevel,
    ReadPreference,
    ReplicaSet,
    W,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagField {
    Fsync,
    Journal,
    Tls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MillisField {
    ConnectTimeout,
    HeartbeatInterval,
    LocalThreshold,
    MaxIdleTime,
    MaxLifetime,
    ServerSelectionTimeout,
    SocketTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountField {
    MaxConnsPerHost,
    MaxIdleConnsPerHost,
}

/// How a recognized option is coerced and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Text(TextField),
    Flag(FlagField),
    Millis(MillisField),
    Count(CountField),
    Connect,
    AuthMechanismProperties,
    ReadPreferenceTags,
    Compressors,
    MaxPoolSize,
    WTimeoutMs,
    WTimeout,
}

/// Recognized option keys, lowercased.
const RULES: &[(&str, Rule)] = &[
    ("appname", Rule::Text(TextField::AppName)),
    ("authmechanism", Rule::Text(TextField::AuthMechanism)),
    ("authmechanismproperties", Rule::AuthMechanismProperties),
    ("authsource", Rule::Text(TextField::AuthSource)),
    ("compressors", Rule::Compressors),
    ("connect", Rule::Connect),
    ("connecttimeoutms", Rule::Millis(MillisField::ConnectTimeout)),
    ("fsync", Rule::Flag(FlagField::Fsync)),
    ("gssapihostname", Rule::Text(TextField::GssapiHostName)),
    ("gssapiservicename", Rule::Text(TextField::GssapiServiceName)),
    ("heartbeatfrequencyms", Rule::Millis(MillisField::HeartbeatInterval)),
    ("heartbeatintervalms", Rule::Millis(MillisField::HeartbeatInterval)),
    ("j", Rule::Flag(FlagField::Journal)),
    ("localthresholdms", Rule::Millis(MillisField::LocalThreshold)),
    ("maxconnsperhost", Rule::Count(CountField::MaxConnsPerHost)),
    ("maxidleconnsperhost", Rule::Count(CountField::MaxIdleConnsPerHost)),
    ("maxidletimems", Rule::Millis(MillisField::MaxIdleTime)),
    ("maxlifetimems", Rule::Millis(MillisField::MaxLifetime)),
    ("maxpoolsize", Rule::MaxPoolSize),
    ("readconcernlevel", Rule::Text(TextField::ReadConcernLevel)),
    ("readpreference", Rule::Text(TextField::ReadPreference)),
    ("readpreferencetags", Rule::ReadPreferenceTags),
    ("replicaset", Rule::Text(TextField::ReplicaSet)),
    ("serverselectiontimeoutms", Rule::Millis(MillisField::ServerSelectionTimeout)),
    ("sockettimeoutms", Rule::Millis(MillisField::SocketTimeout)),
    ("ssl", Rule::Flag(FlagField::Tls)),
    ("tls", Rule::Flag(FlagField::Tls)),
    ("w", Rule::Text(TextField::W)),
    ("wtimeout", Rule::WTimeout),
    ("wtimeoutms", Rule::WTimeoutMs),
];

fn rule_for(key: &str) -> Option<Rule> {
    RULES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
}

/// Splits a query string or TXT record into its non-empty pairs.
pub(crate) fn split_pairs(input: &str) -> impl Iterator<Item = &str> {
    input.split(OPTION_SEPARATORS).filter(|pair| !pair.is_empty())
}

/// Decodes one raw `key=value` pair and applies it to `config`.
///
/// Every accepted pair is also recorded under its lowercased key in the
/// catch-all option map, recognized or not.
pub(crate) fn apply_option(config: &mut ConnectionConfig, pair: &str) -> Result<(), ParseErrorKind> {
    let (raw_key, raw_value) = pair
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| ParseErrorKind::InvalidOptionSyntax {
            pair: pair.to_string(),
        })?;

    let key = percent_decode(raw_key).map_err(|source| ParseErrorKind::InvalidOptionKey {
        key: raw_key.to_string(),
        source,
    })?;
    let value =
        percent_decode(raw_value).map_err(|source| ParseErrorKind::InvalidOptionValue {
            key: key.clone(),
            value: raw_value.to_string(),
            reason: OptionValueError::Decode(source),
        })?;

    let normalized = key.to_lowercase();
    match rule_for(&normalized) {
        Some(rule) => {
            rule.apply(config, &value)
                .map_err(|reason| ParseErrorKind::InvalidOptionValue {
                    key,
                    value: value.clone(),
                    reason,
                })?;
        }
        None => {
            trace!(key = %normalized, "unrecognized connection option");
            config
                .unknown_options
                .entry(normalized.clone())
                .or_default()
                .push(value.clone());
        }
    }

    config.options.entry(normalized).or_default().push(value);
    Ok(())
}

impl Rule {
    fn apply(self, config: &mut ConnectionConfig, value: &str) -> Result<(), OptionValueError> {
        match self {
            Self::Text(field) => *text_slot(config, field) = Some(value.to_string()),
            Self::Flag(field) => {
                let flag = parse_bool(value)?;
                match field {
                    FlagField::Fsync => config.fsync = Some(flag),
                    FlagField::Journal => config.journal = Some(flag),
                    FlagField::Tls => config.use_tls = flag,
                }
            }
            Self::Millis(field) => *millis_slot(config, field) = Some(parse_millis(value)?),
            Self::Count(field) => *count_slot(config, field) = Some(parse_count(value)?),
            Self::Connect => config.connect_mode = parse_connect(value)?,
            Self::AuthMechanismProperties => {
                config.auth_mechanism_properties = parse_properties(value)?;
            }
            Self::ReadPreferenceTags => {
                let tags = parse_tag_set(value)?;
                config.read_preference_tag_sets.push(tags);
            }
            Self::Compressors => {
                config.compressors = value
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Self::MaxPoolSize => {
                let size = parse_count(value)?;
                config.max_conns_per_host = Some(size);
                config.max_idle_conns_per_host = Some(size);
            }
            Self::WTimeoutMs => {
                config.wtimeout = Some(parse_millis(value)?);
                config.wtimeout_ms_seen = true;
            }
            Self::WTimeout => {
                let timeout = parse_millis(value)?;
                if config.wtimeout_ms_seen {
                    trace!("ignoring wtimeout; wtimeoutMS takes precedence");
                } else {
                    config.wtimeout = Some(timeout);
                }
            }
        }
        Ok(())
    }
}

fn text_slot(config: &mut ConnectionConfig, field: TextField) -> &mut Option<String> {
    match field {
        TextField::AppName => &mut config.app_name,
        TextField::AuthMechanism => &mut config.auth_mechanism,
        TextField::AuthSource => &mut config.auth_source,
        TextField::GssapiServiceName => &mut config.gssapi_service_name,
        TextField::GssapiHostName => &mut config.gssapi_host_name,
        TextField::ReadConcernLevel => &mut config.read_concern_level,
        TextField::ReadPreference => &mut config.read_preference,
        TextField::ReplicaSet => &mut config.replica_set,
        TextField::W => &mut config.w,
    }
}

fn millis_slot(config: &mut ConnectionConfig, field: MillisField) -> &mut Option<Duration> {
    match field {
        MillisField::ConnectTimeout => &mut config.connect_timeout,
        MillisField::HeartbeatInterval => &mut config.heartbeat_interval,
        MillisField::LocalThreshold => &mut config.local_threshold,
        MillisField::MaxIdleTime => &mut config.max_idle_time,
        MillisField::MaxLifetime => &mut config.max_lifetime,
        MillisField::ServerSelectionTimeout => &mut config.server_selection_timeout,
        MillisField::SocketTimeout => &mut config.socket_timeout,
    }
}

fn count_slot(config: &mut ConnectionConfig, field: CountField) -> &mut Option<u32> {
    match field {
        CountField::MaxConnsPerHost => &mut config.max_conns_per_host,
        CountField::MaxIdleConnsPerHost => &mut config.max_idle_conns_per_host,
    }
}

fn parse_bool(value: &str) -> Result<bool, OptionValueError> {
    match value {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Ok(false),
        _ => Err(OptionValueError::NotBoolean),
    }
}

fn parse_non_negative(value: &str) -> Result<u64, OptionValueError> {
    value.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => OptionValueError::OutOfRange { max: u64::MAX },
        _ => OptionValueError::NotNonNegativeInteger,
    })
}

fn parse_millis(value: &str) -> Result<Duration, OptionValueError> {
    parse_non_negative(value).map(Duration::from_millis)
}

fn parse_count(value: &str) -> Result<u32, OptionValueError> {
    let n = parse_non_negative(value)?;
    u32::try_from(n).map_err(|_| OptionValueError::OutOfRange {
        max: u64::from(u32::MAX),
    })
}

fn parse_connect(value: &str) -> Result<ConnectMode, OptionValueError> {
    match value.to_lowercase().as_str() {
        "auto" | "automatic" => Ok(ConnectMode::Automatic),
        "direct" | "single" => Ok(ConnectMode::Single),
        _ => Err(OptionValueError::UnknownConnectMode),
    }
}

/// Parses `k1:v1,k2:v2`. Values may themselves contain `:`.
fn parse_properties(value: &str) -> Result<BTreeMap<String, String>, OptionValueError> {
    value
        .split(',')
        .map(|item| match item.split_once(':') {
            Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
            _ => Err(OptionValueError::MalformedItem {
                item: item.to_string(),
                expected: "key:value",
            }),
        })
        .collect()
}

/// Parses `tag:value,tag:value`. Every item, including an empty one, needs
/// exactly one `:`.
fn parse_tag_set(value: &str) -> Result<BTreeMap<String, String>, OptionValueError> {
    value
        .split(',')
        .map(|item| {
            let mut parts = item.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(tag), Some(val), None) => Ok((tag.to_string(), val.to_string())),
                _ => Err(OptionValueError::MalformedItem {
                    item: item.to_string(),
                    expected: "tag:value",
                }),
            }
        })
        .collect()
}
