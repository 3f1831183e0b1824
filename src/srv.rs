//! SRV seed list resolution.
//!
//! A `mongodb+srv` URI names a single seed hostname. Its SRV records under
//! `_mongodb._tcp.<seed>` supply the real host list, and every target must
//! live under the seed's parent domain.

use tracing::debug;

use crate::constants::{SRV_PROTOCOL, SRV_SERVICE};
use crate::error::ParseErrorKind;
use crate::host::split_host_port;
use crate::resolver::Resolver;

/// Expands `seed` into `target:port` host strings via SRV records.
pub(crate) fn resolve_seedlist<R>(resolver: &R, seed: &str) -> Result<Vec<String>, ParseErrorKind>
where
    R: Resolver + ?Sized,
{
    if seed.is_empty() {
        return Err(ParseErrorKind::NoHosts);
    }

    let (_, port) = split_host_port(seed).map_err(|reason| ParseErrorKind::MalformedHost {
        host: seed.to_string(),
        reason,
    })?;
    if port.is_some() {
        return Err(ParseErrorKind::SrvHostHasPort {
            host: seed.to_string(),
        });
    }

    let records = resolver
        .lookup_srv(SRV_SERVICE, SRV_PROTOCOL, seed)
        .map_err(|source| ParseErrorKind::SrvLookupFailed {
            host: seed.to_string(),
            source,
        })?;

    let seed = trim_root(seed);
    let hosts = records
        .iter()
        .map(|record| {
            let target = trim_root(&record.target);
            validate_target(target, seed)?;
            Ok(format!("{target}:{}", record.port))
        })
        .collect::<Result<Vec<_>, ParseErrorKind>>()?;

    debug!(seed, hosts = hosts.len(), "resolved SRV seed list");
    Ok(hosts)
}

/// Checks that `target` lies within the parent domain of `seed`.
///
/// The parent domain is every label of the seed after the first. The
/// target needs at least two labels and must end with exactly those
/// labels, compared case-sensitively.
pub(crate) fn validate_target(target: &str, seed: &str) -> Result<(), ParseErrorKind> {
    let target_labels: Vec<&str> = target.split('.').collect();
    let seed_suffix: Vec<&str> = seed.split('.').skip(1).collect();

    if target_labels.len() < 2 {
        return Err(ParseErrorKind::InsufficientSrvLabels {
            target: target.to_string(),
        });
    }

    let mismatch = || ParseErrorKind::SrvDomainMismatch {
        target: target.to_string(),
        domain: seed_suffix.join("."),
    };

    if target_labels.len() < seed_suffix.len() {
        return Err(mismatch());
    }
    let offset = target_labels.len() - seed_suffix.len();
    if target_labels[offset..] != seed_suffix[..] {
        return Err(mismatch());
    }

    Ok(())
}

fn trim_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
