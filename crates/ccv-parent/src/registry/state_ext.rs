use async_trait::async_trait;
use ccv_core::protocol::{
    child::v1::GenesisState,
    client::v1::ClientId,
};
use cnidarium::{
    StateRead,
    StateWrite,
};
use eyre::{
    Result,
    WrapErr as _,
};
use tracing::instrument;

use super::storage::{
    self,
    keys,
};
use crate::{
    storage::StoredValue,
    utils::anyhow_to_eyre,
    SpawnError,
};

#[async_trait]
pub(crate) trait StateReadExt: StateRead {
    #[instrument(skip_all, fields(%chain_id))]
    async fn get_child_client(&self, chain_id: &str) -> Result<Option<ClientId>> {
        let Some(bytes) = self
            .get_raw(&keys::child_client(chain_id))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw child client id from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::ChildClientId::try_from(value).map(ClientId::from))
            .map(Some)
            .wrap_err("invalid child client id bytes")
    }

    #[instrument(skip_all, fields(%chain_id))]
    async fn get_child_genesis(&self, chain_id: &str) -> Result<Option<GenesisState>> {
        let Some(bytes) = self
            .get_raw(&keys::child_genesis(chain_id))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw child genesis from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::ChildGenesisDocument::try_from(value).and_then(GenesisState::try_from)
            })
            .map(Some)
            .wrap_err("invalid child genesis bytes")
    }
}

impl<T: StateRead> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    /// Registers the light client and genesis of a spawned chain.
    ///
    /// Fails with [`SpawnError::DuplicateChain`] if the chain is already registered.
    #[instrument(skip_all, fields(%chain_id, %client_id), err)]
    async fn register_child_chain(
        &mut self,
        chain_id: &str,
        client_id: &ClientId,
        genesis: &GenesisState,
    ) -> Result<()> {
        if self
            .get_child_client(chain_id)
            .await
            .wrap_err("failed reading child client")?
            .is_some()
        {
            return Err(SpawnError::DuplicateChain {
                chain_id: chain_id.to_string(),
            })
            .wrap_err("refusing to register chain twice");
        }

        let bytes = StoredValue::from(storage::ChildClientId::from(client_id))
            .serialize()
            .wrap_err("failed to serialize child client id")?;
        self.put_raw(keys::child_client(chain_id), bytes);

        let bytes = storage::ChildGenesisDocument::try_from(genesis)
            .and_then(|document| StoredValue::from(document).serialize())
            .wrap_err("failed to serialize child genesis")?;
        self.put_raw(keys::child_genesis(chain_id), bytes);
        Ok(())
    }
}

impl<T: StateWrite> StateWriteExt for T {}
