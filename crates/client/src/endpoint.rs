// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection URL validation and composition.
//!
//! The composed URL is fixed at construction time: scheme checked against
//! the secure-only policy, configured query parameters appended in order.

use url::Url;

use crate::error::{Error, Result};

/// Validate a connection URL and append query parameters.
///
/// Accepts only `ws` and `wss` schemes; with `secure_only`, plain `ws` is
/// rejected outright.
pub fn compose(raw: &str, query_params: &[(String, String)], secure_only: bool) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "wss" => {}
        "ws" if !secure_only => {}
        "ws" => return Err(Error::InsecureScheme("ws".to_string())),
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{other}', expected ws or wss"
            )));
        }
    }

    if !query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query_params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
