//! User-info parsing.

use crate::decode::percent_decode;
use crate::error::ParseErrorKind;

/// Decoded user-info from the authority section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
    /// True iff a `:` separated the username from a (possibly empty) password.
    pub(crate) password_set: bool,
}

impl Credentials {
    /// Parses the substring preceding the `@`.
    ///
    /// The username is everything before the first `:`. Separators that
    /// belong in either part must be percent-escaped.
    pub(crate) fn parse(user_info: &str) -> Result<Self, ParseErrorKind> {
        let (username, password) = match user_info.split_once(':') {
            Some((username, password)) => (username, Some(password)),
            None => (user_info, None),
        };

        if username.contains('/') {
            return Err(ParseErrorKind::UnescapedSlashInUsername);
        }
        if password.is_some_and(|p| p.contains([':', '/'])) {
            return Err(ParseErrorKind::UnescapedColonOrSlashInPassword);
        }

        let username = percent_decode(username).map_err(|source| {
            ParseErrorKind::InvalidCredential {
                field: "username",
                source,
            }
        })?;
        let decoded_password = password
            .map(percent_decode)
            .transpose()
            .map_err(|source| ParseErrorKind::InvalidCredential {
                field: "password",
                source,
            })?;

        Ok(Self {
            username,
            password_set: decoded_password.is_some(),
            password: decoded_password.unwrap_or_default(),
        })
    }
}
