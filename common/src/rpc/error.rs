use serde_json::Value;
use thiserror::Error;

// Error code used by nodes when a call reverts
pub const EXECUTION_ERROR_CODE: i64 = 3;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Transport error: {}", _0)]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {}", _0)]
    HttpStatus(u16),
    #[error("Invalid JSON-RPC response: {}", _0)]
    InvalidResponse(#[from] serde_json::Error),
    #[error("RPC error {}: {}", code, message)]
    Server {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("RPC response for '{}' is missing its result", _0)]
    MissingResult(String),
}

impl RpcError {
    // A reverted or otherwise failing contract execution,
    // as opposed to an unreachable or misbehaving node
    pub fn is_execution_error(&self) -> bool {
        match self {
            Self::Server { code, message, .. } => {
                *code == EXECUTION_ERROR_CODE || message.to_lowercase().contains("revert")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_detection() {
        let reverted = RpcError::Server {
            code: 3,
            message: "execution reverted: Apartment not found".into(),
            data: None,
        };
        assert!(reverted.is_execution_error());

        let reverted = RpcError::Server {
            code: -32000,
            message: "VM Exception while processing transaction: revert".into(),
            data: None,
        };
        assert!(reverted.is_execution_error());

        let unknown_account = RpcError::Server {
            code: -32000,
            message: "unknown account".into(),
            data: None,
        };
        assert!(!unknown_account.is_execution_error());
        assert!(!RpcError::HttpStatus(502).is_execution_error());
    }
}
