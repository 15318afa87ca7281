use async_trait::async_trait;
use ccv_core::protocol::client::v1::{
    ClientId,
    ClientState,
    ConsensusState,
};
use cnidarium::{
    StateRead,
    StateWrite,
};
use eyre::{
    OptionExt as _,
    Result,
    WrapErr as _,
};
use tracing::{
    debug,
    instrument,
};

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
    /// Returns the number of light clients created so far.
    #[instrument(skip_all)]
    async fn get_client_counter(&self) -> Result<u64> {
        let Some(bytes) = self
            .get_raw(keys::CLIENT_COUNTER)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw client counter from state")?
        else {
            return Ok(0);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::ClientCounter::try_from(value).map(u64::from))
            .wrap_err("invalid client counter bytes")
    }

    #[instrument(skip_all, fields(%client_id))]
    async fn get_client_state(&self, client_id: &ClientId) -> Result<Option<ClientState>> {
        let Some(bytes) = self
            .get_raw(&keys::client_state(client_id))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw client state from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::ClientStateDocument::try_from(value).and_then(ClientState::try_from)
            })
            .map(Some)
            .wrap_err("invalid client state bytes")
    }

    /// Returns the consensus state the client tracks at its latest height.
    #[instrument(skip_all, fields(%client_id))]
    async fn get_client_consensus_state(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<ConsensusState>> {
        let Some(client_state) = self
            .get_client_state(client_id)
            .await
            .wrap_err("failed reading client state")?
        else {
            return Ok(None);
        };
        let Some(bytes) = self
            .get_raw(&keys::consensus_state(
                client_id,
                client_state.latest_height,
            ))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw client consensus state from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::ConsensusStateDocument::try_from(value).and_then(ConsensusState::try_from)
            })
            .map(Some)
            .wrap_err("invalid client consensus state bytes")
    }
}

impl<T: StateRead> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    #[instrument(skip_all)]
    fn put_client_counter(&mut self, counter: u64) -> Result<()> {
        let bytes = StoredValue::from(storage::ClientCounter::from(counter))
            .serialize()
            .wrap_err("failed to serialize client counter")?;
        self.put_raw(keys::CLIENT_COUNTER.to_string(), bytes);
        Ok(())
    }

    #[instrument(skip_all, fields(%client_id))]
    fn put_client_state(&mut self, client_id: &ClientId, client_state: &ClientState) -> Result<()> {
        let bytes = storage::ClientStateDocument::try_from(client_state)
            .and_then(|document| StoredValue::from(document).serialize())
            .wrap_err("failed to serialize client state")?;
        self.put_raw(keys::client_state(client_id), bytes);
        Ok(())
    }

    /// Stores the consensus state of the client at the client's latest height.
    #[instrument(skip_all, fields(%client_id))]
    fn put_client_consensus_state(
        &mut self,
        client_id: &ClientId,
        client_state: &ClientState,
        consensus_state: &ConsensusState,
    ) -> Result<()> {
        let bytes = storage::ConsensusStateDocument::try_from(consensus_state)
            .and_then(|document| StoredValue::from(document).serialize())
            .wrap_err("failed to serialize client consensus state")?;
        self.put_raw(
            keys::consensus_state(client_id, client_state.latest_height),
            bytes,
        );
        Ok(())
    }

    /// Registers a new light client and returns the identifier assigned to it.
    ///
    /// Identifiers are `07-tendermint-{n}`, with `n` counting up from 0 across all
    /// clients created on the host.
    #[instrument(skip_all, fields(chain_id = %client_state.chain_id))]
    async fn create_client(
        &mut self,
        client_state: &ClientState,
        consensus_state: &ConsensusState,
    ) -> Result<ClientId> {
        let counter = self
            .get_client_counter()
            .await
            .wrap_err("failed reading client counter")?;
        let client_id = ClientId::tendermint(counter);
        let next_counter = counter
            .checked_add(1)
            .ok_or_eyre("client counter overflowed")?;

        self.put_client_state(&client_id, client_state)
            .wrap_err("failed writing client state")?;
        self.put_client_consensus_state(&client_id, client_state, consensus_state)
            .wrap_err("failed writing client consensus state")?;
        self.put_client_counter(next_counter)
            .wrap_err("failed writing client counter")?;
        debug!(%client_id, "created light client");
        Ok(client_id)
    }
}

impl<T: StateWrite> StateWriteExt for T {}

#[cfg(test)]
mod tests {
    use ccv_core::protocol::{
        client::v1::Height,
        parent::v1::TrustParams,
    };
    use cnidarium::StateDelta;
    use tendermint::{
        Hash,
        Time,
    };

    use super::*;
    use crate::clients::ClientStateBuilder;

    fn client_state(chain_id: &str) -> ClientState {
        ClientStateBuilder::new(&TrustParams::default())
            .unwrap()
            .build(chain_id, Height::new(2, 3))
            .unwrap()
    }

    fn consensus_state() -> ConsensusState {
        ConsensusState::new(
            Time::parse_from_rfc3339("2020-01-02T00:00:25Z").unwrap(),
            b"sentinel_root".to_vec(),
            Hash::Sha256([7; 32]),
        )
    }

    #[tokio::test]
    async fn client_counter_defaults_to_zero() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let snapshot = storage.latest_snapshot();
        let state = StateDelta::new(snapshot);

        assert_eq!(state.get_client_counter().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn created_clients_get_increasing_ids() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let snapshot = storage.latest_snapshot();
        let mut state = StateDelta::new(snapshot);

        let first = state
            .create_client(&client_state("a"), &consensus_state())
            .await
            .unwrap();
        let second = state
            .create_client(&client_state("b"), &consensus_state())
            .await
            .unwrap();

        assert_eq!(first.as_str(), "07-tendermint-0");
        assert_eq!(second.as_str(), "07-tendermint-1");
        assert_eq!(state.get_client_counter().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn created_client_can_be_read_back() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let snapshot = storage.latest_snapshot();
        let mut state = StateDelta::new(snapshot);

        let client_id = state
            .create_client(&client_state("chainID"), &consensus_state())
            .await
            .unwrap();

        assert_eq!(
            state.get_client_state(&client_id).await.unwrap(),
            Some(client_state("chainID"))
        );
        assert_eq!(
            state.get_client_consensus_state(&client_id).await.unwrap(),
            Some(consensus_state())
        );
    }

    #[tokio::test]
    async fn unknown_client_is_none() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let snapshot = storage.latest_snapshot();
        let state = StateDelta::new(snapshot);

        let client_id = ClientId::tendermint(3);
        assert_eq!(state.get_client_state(&client_id).await.unwrap(), None);
        assert_eq!(
            state.get_client_consensus_state(&client_id).await.unwrap(),
            None
        );
    }
}
