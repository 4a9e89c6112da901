//! Matrix server name normalization
//!
//! Users type server names in all sorts of shapes (`Matrix.org`,
//! `https://matrix.org/`, ` example.com:8448 `). Every probe keys its state on
//! the normalized form so that the same server is never fetched twice under
//! two spellings.

use crate::shared::error::SharedError;

const FIELD: &str = "server_name";

/// Normalize and validate a server name.
///
/// Strips surrounding whitespace, an `http://` / `https://` prefix and any
/// trailing slashes, then lowercases the host part. Accepts
/// `hostname[:port]` and `[ipv6][:port]`.
pub fn normalize_server_name(input: &str) -> Result<String, SharedError> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let name = without_scheme.trim_end_matches('/');

    if name.is_empty() {
        return Err(SharedError::validation(FIELD, "Server name cannot be empty"));
    }
    if name.contains('/') || name.contains(char::is_whitespace) {
        return Err(SharedError::validation(
            FIELD,
            format!("'{}' is not a server name", name),
        ));
    }

    let (host, port) = split_host_port(name)?;
    if let Some(port) = port {
        if port.parse::<u16>().map(|p| p == 0).unwrap_or(true) {
            return Err(SharedError::validation(
                FIELD,
                format!("Invalid port '{}'", port),
            ));
        }
    }

    let valid_host = if host.starts_with('[') {
        host.len() > 2
            && host.ends_with(']')
            && host[1..host.len() - 1]
                .chars()
                .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.')
    } else {
        !host.is_empty()
            && host
                .split('.')
                .all(|label| {
                    !label.is_empty()
                        && !label.starts_with('-')
                        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                })
    };
    if !valid_host {
        return Err(SharedError::validation(
            FIELD,
            format!("Invalid host '{}'", host),
        ));
    }

    Ok(name.to_ascii_lowercase())
}

fn split_host_port(name: &str) -> Result<(&str, Option<&str>), SharedError> {
    if name.starts_with('[') {
        return match name.find(']') {
            Some(end) => {
                let (host, rest) = name.split_at(end + 1);
                match rest.strip_prefix(':') {
                    Some(port) => Ok((host, Some(port))),
                    None if rest.is_empty() => Ok((host, None)),
                    None => Err(SharedError::validation(
                        FIELD,
                        format!("Unexpected '{}' after IPv6 literal", rest),
                    )),
                }
            }
            None => Err(SharedError::validation(FIELD, "Unterminated IPv6 literal")),
        };
    }
    Ok(match name.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (name, None),
    })
}
