//! Result encoding: the entrypoint's return value becomes the run's
//! single output string.

use rhai::Dynamic;

use scriptact_core::{Encoding, Error, Result};

/// Encode the returned value under the configured result encoding.
///
/// `string` is a display passthrough: non-primitive values render their
/// default textual form, not a structural serialization. `json` is a
/// structural serde pass and fails on values with non-serializable
/// members (e.g. a captured host handle).
pub fn encode_result(value: &Dynamic, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::String => Ok(value.to_string()),
        Encoding::Json => serde_json::to_string(value)
            .map_err(|e| Error::Encoding(format!("result is not JSON-serializable: {e}"))),
    }
}
