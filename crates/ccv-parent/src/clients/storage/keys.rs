use ccv_core::protocol::client::v1::{
    ClientId,
    Height,
};

pub(in crate::clients) const CLIENT_COUNTER: &str = "clients/counter";

/// Example: `clients/07-tendermint-0/client_state`.
pub(in crate::clients) fn client_state(client_id: &ClientId) -> String {
    format!("clients/{client_id}/client_state")
}

/// Example: `clients/07-tendermint-0/consensus_state/2-3`.
///                                                  |height|
pub(in crate::clients) fn consensus_state(client_id: &ClientId, height: Height) -> String {
    format!("clients/{client_id}/consensus_state/{height}")
}
