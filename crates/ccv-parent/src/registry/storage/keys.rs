/// Example: `parent/child_client/chainID`.
pub(in crate::registry) fn child_client(chain_id: &str) -> String {
    format!("parent/child_client/{chain_id}")
}

/// Example: `parent/child_genesis/chainID`.
pub(in crate::registry) fn child_genesis(chain_id: &str) -> String {
    format!("parent/child_genesis/{chain_id}")
}
