//! Token URI lookup.
//!
//! Two resolvers: an on-chain `tokenURI(uint256)` read through a JSON-RPC
//! `eth_call`, and a plain template for collections that publish a directory
//! content-address.

use std::time::Duration;

use crate::{AcquisitionError, TokenId};

/// First four bytes of keccak256("tokenURI(uint256)").
const TOKEN_URI_SELECTOR: &str = "c87b56dd";
const WORD_BYTES: usize = 32;

pub(crate) trait TokenUriResolver: Send + Sync {
    fn token_uri(&self, token_id: TokenId) -> Result<String, AcquisitionError>;
}

pub(crate) struct TemplateTokenUri {
    base_uri: String,
}

impl TemplateTokenUri {
    pub(crate) fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
        }
    }
}

impl TokenUriResolver for TemplateTokenUri {
    fn token_uri(&self, token_id: TokenId) -> Result<String, AcquisitionError> {
        Ok(format!("{}{token_id}", self.base_uri))
    }
}

pub(crate) struct RpcTokenUri {
    agent: ureq::Agent,
    rpc_url: String,
    contract: String,
}

impl RpcTokenUri {
    pub(crate) fn new(rpc_url: impl Into<String>, contract: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            agent,
            rpc_url: rpc_url.into(),
            contract: contract.into(),
        }
    }
}

impl TokenUriResolver for RpcTokenUri {
    fn token_uri(&self, token_id: TokenId) -> Result<String, AcquisitionError> {
        let rpc_err = |message: String| AcquisitionError::Rpc { token_id, message };
        let payload = eth_call_payload(&self.contract, token_id);
        let response: serde_json::Value = match self.agent.post(&self.rpc_url).send_json(payload) {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| rpc_err(format!("response body: {e}")))?,
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                return Err(rpc_err(format!("{code} {text}")));
            }
            Err(ureq::Error::Transport(err)) => return Err(rpc_err(err.to_string())),
        };
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(rpc_err(message.to_string()));
        }
        let result = response
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| rpc_err("response missing result".to_string()))?;
        decode_abi_string(result)
    }
}

pub(crate) fn eth_call_payload(contract: &str, token_id: TokenId) -> serde_json::Value {
    let data = format!("0x{TOKEN_URI_SELECTOR}{token_id:064x}");
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": token_id,
        "method": "eth_call",
        "params": [{"to": contract, "data": data}, "latest"]
    })
}

/// Decode a single ABI-encoded `string` return value (offset word, length
/// word, padded bytes).
pub(crate) fn decode_abi_string(encoded: &str) -> Result<String, AcquisitionError> {
    let decode_err = |message: String| AcquisitionError::Decode {
        context: "tokenURI return data".into(),
        message,
    };
    let raw = encoded.trim().trim_start_matches("0x");
    let bytes = hex::decode(raw).map_err(|e| decode_err(e.to_string()))?;

    let offset = read_word(&bytes, 0).ok_or_else(|| decode_err("missing offset word".into()))?;
    let len = read_word(&bytes, offset).ok_or_else(|| decode_err("missing length word".into()))?;
    let start = offset + WORD_BYTES;
    let end = start
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| decode_err(format!("string of {len} bytes overruns {} bytes", bytes.len())))?;
    String::from_utf8(bytes[start..end].to_vec()).map_err(|e| decode_err(e.to_string()))
}

fn read_word(bytes: &[u8], at: usize) -> Option<usize> {
    let word = bytes.get(at..at.checked_add(WORD_BYTES)?)?;
    // Anything that does not fit in the low eight bytes cannot be a real offset.
    if word[..WORD_BYTES - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD_BYTES - 8..]);
    usize::try_from(u64::from_be_bytes(low)).ok()
}
