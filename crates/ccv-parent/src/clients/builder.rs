use ccv_core::protocol::{
    client::v1::{
        ClientState,
        Height,
    },
    parent::v1::TrustParams,
};
use eyre::{
    ensure,
    Result,
    WrapErr as _,
};

use crate::SpawnError;

/// Builds tendermint light client descriptors from the parent's trust parameters.
///
/// The parameters are validated once on construction, so that every descriptor
/// handed out by [`ClientStateBuilder::build`] is usable.
#[derive(Debug)]
pub(crate) struct ClientStateBuilder<'a> {
    params: &'a TrustParams,
}

impl<'a> ClientStateBuilder<'a> {
    pub(crate) fn new(params: &'a TrustParams) -> Result<Self> {
        params
            .validate()
            .map_err(SpawnError::Config)
            .wrap_err("refusing to build light clients from invalid trust parameters")?;
        Ok(Self {
            params,
        })
    }

    /// Builds the descriptor of a light client tracking `chain_id` from `latest_height`.
    ///
    /// Repeated calls with the same arguments yield identical descriptors.
    pub(crate) fn build(&self, chain_id: &str, latest_height: Height) -> Result<ClientState> {
        ensure!(
            !latest_height.is_zero(),
            "light client of chain `{chain_id}` must start at a non-zero height"
        );
        let TrustParams {
            trust_level,
            trusting_period,
            unbonding_period,
            max_clock_drift,
            proof_specs,
            upgrade_path,
            allow_update_after_expiry,
            allow_update_after_misbehaviour,
        } = self.params;
        Ok(ClientState {
            chain_id: chain_id.to_string(),
            trust_level: *trust_level,
            trusting_period: *trusting_period,
            unbonding_period: *unbonding_period,
            max_clock_drift: *max_clock_drift,
            frozen_height: Height::default(),
            latest_height,
            proof_specs: proof_specs.clone(),
            upgrade_path: upgrade_path.clone(),
            allow_update_after_expiry: *allow_update_after_expiry,
            allow_update_after_misbehaviour: *allow_update_after_misbehaviour,
        })
    }
}
