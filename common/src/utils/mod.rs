mod amount;

pub use amount::*;

// Make sure the RPC address has a scheme so reqwest accepts it
// "127.0.0.1:8545" becomes "http://127.0.0.1:8545"
pub fn sanitize_rpc_address(address: &str) -> String {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{}", trimmed)
    }
}
