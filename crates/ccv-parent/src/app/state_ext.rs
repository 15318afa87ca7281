use async_trait::async_trait;
use ccv_core::protocol::client::v1::{
    revision_number_from_chain_id,
    ConsensusState,
};
use cnidarium::{
    StateRead,
    StateWrite,
};
use eyre::{
    bail,
    Result,
    WrapErr as _,
};
use tendermint::Time;
use tracing::instrument;

use super::storage::{
    self,
    keys,
};
use crate::{
    storage::StoredValue,
    utils::anyhow_to_eyre,
};

#[async_trait]
pub(crate) trait StateReadExt: StateRead {
    #[instrument(skip_all)]
    async fn get_chain_id(&self) -> Result<tendermint::chain::Id> {
        let Some(bytes) = self
            .get_raw(keys::CHAIN_ID)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw host chain id from state")?
        else {
            bail!("host chain id not recorded; init_chain has not run");
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::ChainId::try_from(value).and_then(|chain_id| {
                    tendermint::chain::Id::try_from(chain_id).wrap_err("invalid chain id")
                })
            })
            .wrap_err("invalid host chain id bytes")
    }

    #[instrument(skip_all)]
    async fn get_revision_number(&self) -> Result<u64> {
        let Some(bytes) = self
            .get_raw(keys::REVISION_NUMBER)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw host revision number from state")?
        else {
            bail!("host revision number not recorded; init_chain has not run");
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::RevisionNumber::try_from(value).map(u64::from))
            .wrap_err("invalid host revision number bytes")
    }

    #[instrument(skip_all)]
    async fn get_block_height(&self) -> Result<u64> {
        let Some(bytes) = self
            .get_raw(keys::BLOCK_HEIGHT)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw host block height from state")?
        else {
            bail!("host block height not recorded");
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::BlockHeight::try_from(value).map(u64::from))
            .wrap_err("invalid block height bytes")
    }

    #[instrument(skip_all)]
    async fn get_block_timestamp(&self) -> Result<Time> {
        let Some(bytes) = self
            .get_raw(keys::BLOCK_TIMESTAMP)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw host block time from state")?
        else {
            bail!("host block time not recorded; no block has begun");
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::BlockTimestamp::try_from(value).map(Time::from))
            .wrap_err("invalid host block time bytes")
    }

    /// Returns the host chain's own consensus state recorded at `height`, if any.
    #[instrument(skip(self))]
    async fn get_consensus_state_at(&self, height: u64) -> Result<Option<ConsensusState>> {
        let Some(bytes) = self
            .get_raw(&keys::consensus_state_by_height(height))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed to read raw consensus state from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::ConsensusState::try_from(value).and_then(|state| {
                    ConsensusState::try_from(state).wrap_err("invalid next validators hash")
                })
            })
            .map(Some)
            .wrap_err("invalid consensus state bytes")
    }
}

impl<T: StateRead> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    /// Writes the chain ID and the revision number encoded in it.
    #[instrument(skip_all)]
    fn put_chain_id_and_revision_number(&mut self, chain_id: tendermint::chain::Id) -> Result<()> {
        let revision_number = revision_number_from_chain_id(chain_id.as_str());
        let bytes = StoredValue::from(storage::ChainId::from(&chain_id))
            .serialize()
            .wrap_err("failed to serialize chain id")?;
        self.put_raw(keys::CHAIN_ID.to_string(), bytes);

        let bytes = StoredValue::from(storage::RevisionNumber::from(revision_number))
            .serialize()
            .wrap_err("failed to serialize revision number")?;
        self.put_raw(keys::REVISION_NUMBER.to_string(), bytes);
        Ok(())
    }

    #[instrument(skip_all)]
    fn put_block_height(&mut self, height: u64) -> Result<()> {
        let bytes = StoredValue::from(storage::BlockHeight::from(height))
            .serialize()
            .wrap_err("failed to serialize block height")?;
        self.put_raw(keys::BLOCK_HEIGHT.to_string(), bytes);
        Ok(())
    }

    #[instrument(skip_all)]
    fn put_block_timestamp(&mut self, timestamp: Time) -> Result<()> {
        let bytes = StoredValue::from(storage::BlockTimestamp::from(timestamp))
            .serialize()
            .wrap_err("failed to serialize block timestamp")?;
        self.put_raw(keys::BLOCK_TIMESTAMP.to_string(), bytes);
        Ok(())
    }

    #[instrument(skip(self, state))]
    fn put_consensus_state_at(&mut self, height: u64, state: &ConsensusState) -> Result<()> {
        let bytes = StoredValue::from(storage::ConsensusState::from(state))
            .serialize()
            .wrap_err("failed to serialize consensus state")?;
        self.put_raw(keys::consensus_state_by_height(height), bytes);
        Ok(())
    }
}

impl<T: StateWrite> StateWriteExt for T {}
