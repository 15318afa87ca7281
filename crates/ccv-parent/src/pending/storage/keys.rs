use eyre::{
    OptionExt as _,
    Result,
    WrapErr as _,
};

pub(in crate::pending) const PENDING_CLIENT_PREFIX: &str = "parent/pending_client/";
const PENDING_CHAIN_PREFIX: &str = "parent/pending_chain/";

/// Example: `parent/pending_client/001577923225000000000/chainID`.
///                                 |  spawn time nanos   |chain id|
///
/// The spawn time is zero-padded to 21 digits, enough for any timestamp up to the
/// year 9999, so that lexicographic key order is chronological order.
pub(in crate::pending) fn pending_client(spawn_time_nanos: u128, chain_id: &str) -> String {
    format!("{PENDING_CLIENT_PREFIX}{spawn_time_nanos:021}/{chain_id}")
}

/// Example: `parent/pending_chain/chainID`.
pub(in crate::pending) fn pending_chain(chain_id: &str) -> String {
    format!("{PENDING_CHAIN_PREFIX}{chain_id}")
}

/// Splits a key created by [`pending_client`] into spawn time nanos and chain ID.
pub(in crate::pending) fn extract_spawn_time_and_chain_id(key: &str) -> Result<(u128, &str)> {
    let (nanos, chain_id) = key
        .strip_prefix(PENDING_CLIENT_PREFIX)
        .and_then(|suffix| suffix.split_once('/'))
        .ok_or_eyre("key is not a pending client key")?;
    let nanos = nanos
        .parse()
        .wrap_err("spawn time segment is not an unsigned integer")?;
    Ok((nanos, chain_id))
}
