use async_trait::async_trait;
use ccv_core::protocol::parent::v1::Params;
use cnidarium::{
    StateRead,
    StateWrite,
};
use eyre::{
    bail,
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
};

#[async_trait]
pub(crate) trait StateReadExt: StateRead {
    #[instrument(skip_all)]
    async fn get_params(&self) -> Result<Params> {
        let Some(bytes) = self
            .get_raw(keys::PARAMS)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw params from state")?
        else {
            bail!("params not found in state");
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::ParamsDocument::try_from(value).and_then(Params::try_from))
            .wrap_err("invalid params bytes")
    }
}

impl<T: StateRead> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    #[instrument(skip_all)]
    fn put_params(&mut self, params: &Params) -> Result<()> {
        let bytes = storage::ParamsDocument::try_from(params)
            .and_then(|document| StoredValue::from(document).serialize())
            .wrap_err("failed to serialize params")?;
        self.put_raw(keys::PARAMS.to_string(), bytes);
        Ok(())
    }
}

impl<T: StateWrite> StateWriteExt for T {}
