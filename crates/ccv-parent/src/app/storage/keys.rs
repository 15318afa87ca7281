pub(in crate::app) const CHAIN_ID: &str = "app/chain_id";
pub(in crate::app) const REVISION_NUMBER: &str = "app/revision_number";
pub(in crate::app) const BLOCK_HEIGHT: &str = "app/block_height";
pub(in crate::app) const BLOCK_TIMESTAMP: &str = "app/block_timestamp";

/// Example: `app/consensus_state/00000000000000000005`.
///                               |u64 zero-padded|
pub(in crate::app) fn consensus_state_by_height(height: u64) -> String {
    format!("app/consensus_state/{height:020}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT_PREFIX: &str = "app/";

    #[test]
    fn keys_should_not_change() {
        insta::assert_snapshot!(CHAIN_ID, @"app/chain_id");
        insta::assert_snapshot!(REVISION_NUMBER, @"app/revision_number");
        insta::assert_snapshot!(BLOCK_HEIGHT, @"app/block_height");
        insta::assert_snapshot!(BLOCK_TIMESTAMP, @"app/block_timestamp");
        insta::assert_snapshot!(
            consensus_state_by_height(42),
            @"app/consensus_state/00000000000000000042"
        );
    }

    #[test]
    fn keys_should_have_component_prefix() {
        assert!(CHAIN_ID.starts_with(COMPONENT_PREFIX));
        assert!(REVISION_NUMBER.starts_with(COMPONENT_PREFIX));
        assert!(BLOCK_HEIGHT.starts_with(COMPONENT_PREFIX));
        assert!(BLOCK_TIMESTAMP.starts_with(COMPONENT_PREFIX));
        assert!(consensus_state_by_height(42).starts_with(COMPONENT_PREFIX));
    }
}
