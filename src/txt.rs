//! TXT record option augmentation for `mongodb+srv` URIs.

use tracing::debug;

use crate::constants::ALLOWED_TXT_OPTIONS;
use crate::error::ParseErrorKind;
use crate::options::split_pairs;
use crate::resolver::Resolver;

/// Looks up the TXT record for `seed` and returns its option pairs.
///
/// A failed lookup counts as no record. The returned pairs are raw
/// (still percent-encoded) and are fed to the option parser ahead of the
/// query string.
pub(crate) fn txt_options<R>(resolver: &R, seed: &str) -> Result<Vec<String>, ParseErrorKind>
where
    R: Resolver + ?Sized,
{
    let records = match resolver.lookup_txt(seed) {
        Ok(records) => records,
        Err(e) => {
            debug!(seed, error = %e, "TXT lookup failed; continuing without TXT options");
            return Ok(Vec::new());
        }
    };

    match records.as_slice() {
        [] => Ok(Vec::new()),
        [record] => {
            let pairs = validate_record(record)?;
            debug!(seed, options = pairs.len(), "merging TXT record options");
            Ok(pairs)
        }
        _ => Err(ParseErrorKind::MultipleTxtRecords {
            host: seed.to_string(),
            count: records.len(),
        }),
    }
}

/// Splits a TXT record into option pairs, checking each key against the
/// allow-list.
pub(crate) fn validate_record(record: &str) -> Result<Vec<String>, ParseErrorKind> {
    split_pairs(record)
        .map(|pair| {
            let (key, _) = pair
                .split_once('=')
                .ok_or_else(|| ParseErrorKind::InvalidOptionSyntax {
                    pair: pair.to_string(),
                })?;
            let normalized = key.to_lowercase();
            if !ALLOWED_TXT_OPTIONS.contains(&normalized.as_str()) {
                return Err(ParseErrorKind::DisallowedTxtOption {
                    key: key.to_string(),
                });
            }
            Ok(pair.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{NoResolver, StaticResolver};

    #[test]
    fn allowed_keys_pass_in_order() {
        let pairs = validate_record("replicaSet=rs0&authSource=admin").unwrap();
        assert_eq!(pairs, ["replicaSet=rs0", "authSource=admin"]);
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert!(validate_record("AUTHSOURCE=admin;replicaset=rs0").is_ok());
    }

    #[test]
    fn disallowed_key_rejected() {
        assert_eq!(
            validate_record("foo=bar"),
            Err(ParseErrorKind::DisallowedTxtOption {
                key: "foo".to_string()
            })
        );
        assert!(matches!(
            validate_record("authSource=admin&ssl=false"),
            Err(ParseErrorKind::DisallowedTxtOption { .. })
        ));
    }

    #[test]
    fn pair_without_equals_rejected() {
        assert!(matches!(
            validate_record("authSource"),
            Err(ParseErrorKind::InvalidOptionSyntax { .. })
        ));
    }

    #[test]
    fn missing_record_is_not_an_error() {
        assert!(txt_options(&NoResolver, "c.example.com").unwrap().is_empty());
        assert!(txt_options(&StaticResolver::new(), "c.example.com").unwrap().is_empty());
    }

    #[test]
    fn multiple_records_rejected() {
        let resolver = StaticResolver::new()
            .with_txt("c.example.com", "authSource=admin")
            .with_txt("c.example.com", "replicaSet=rs0");
        assert_eq!(
            txt_options(&resolver, "c.example.com"),
            Err(ParseErrorKind::MultipleTxtRecords {
                host: "c.example.com".to_string(),
                count: 2,
            })
        );
    }
}
