//! Host token parsing.
//!
//! ```text
//! host     = hostname [ ":" port ]
//! hostname = reg-name / "[" IPv6address "]"
//! ```

use crate::constants::MIN_PORT;
use crate::decode::percent_decode;
use crate::error::ParseErrorKind;

/// Parses one comma-delimited host token.
///
/// Returns `Ok(None)` for an empty token, which is skipped rather than
/// rejected. Otherwise returns the decoded token unchanged once its port,
/// if any, has been validated.
pub(crate) fn parse_host_token(token: &str) -> Result<Option<String>, ParseErrorKind> {
    if token.is_empty() {
        return Ok(None);
    }

    let host = percent_decode(token).map_err(|source| ParseErrorKind::InvalidHost {
        host: token.to_string(),
        source,
    })?;

    let (_, port) = split_host_port(&host).map_err(|reason| ParseErrorKind::MalformedHost {
        host: host.clone(),
        reason,
    })?;

    // An empty port (`host:`) counts as no port at all.
    if let Some(port) = port.filter(|p| !p.is_empty() && !is_valid_port(p)) {
        return Err(ParseErrorKind::InvalidPort {
            host: host.clone(),
            port: port.to_string(),
        });
    }

    Ok(Some(host))
}

/// Splits `host[:port]` into its parts.
///
/// A bare hostname may contain at most one `:`; IPv6 addresses must be
/// bracketed. A port that is present but empty is returned as `Some("")`.
pub(crate) fn split_host_port(input: &str) -> Result<(&str, Option<&str>), &'static str> {
    if let Some(rest) = input.strip_prefix('[') {
        let closing = rest
            .find(']')
            .ok_or("missing closing bracket for IPv6 literal")?;
        let host = &rest[..closing];
        let after = &rest[closing + 1..];
        if after.is_empty() {
            return Ok((host, None));
        }
        let port = after
            .strip_prefix(':')
            .ok_or("expected ':' after IPv6 closing bracket")?;
        return Ok((host, Some(port)));
    }

    match input.rfind(':') {
        Some(colon_idx) => {
            let host = &input[..colon_idx];
            if host.contains(':') {
                return Err("too many colons in address; IPv6 addresses must be bracketed");
            }
            Ok((host, Some(&input[colon_idx + 1..])))
        }
        None => Ok((input, None)),
    }
}

fn is_valid_port(port: &str) -> bool {
    !port.is_empty()
        && port.chars().all(|c| c.is_ascii_digit())
        && port.parse::<u16>().is_ok_and(|p| p >= MIN_PORT)
}
