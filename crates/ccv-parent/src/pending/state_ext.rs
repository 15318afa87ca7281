use std::{
    pin::{
        pin,
        Pin,
    },
    task::{
        ready,
        Context,
        Poll,
    },
};

use async_trait::async_trait;
use ccv_core::protocol::client::v1::Height;
use cnidarium::{
    StateRead,
    StateWrite,
};
use eyre::{
    Result,
    WrapErr as _,
};
use futures::{
    Stream,
    TryStreamExt as _,
};
use pin_project_lite::pin_project;
use tendermint::Time;
use tracing::instrument;

use super::{
    storage::{
        self,
        keys,
    },
    PendingClientInfo,
};
use crate::{
    storage::{
        timestamp_from_nanos,
        timestamp_nanos,
        StoredValue,
    },
    utils::anyhow_to_eyre,
};

/// A pending spawn as read from state, together with its spawn time in nanoseconds
/// since the Unix epoch.
#[derive(Debug)]
pub(crate) struct PendingClientEntry {
    pub(crate) spawn_time_nanos: u128,
    pub(crate) spawn_time: Time,
    pub(crate) info: PendingClientInfo,
}

pin_project! {
    /// Pending spawns in ascending order of spawn time, then chain ID.
    pub(crate) struct PendingClientsStream<St> {
        #[pin]
        underlying: St,
    }
}

impl<St> Stream for PendingClientsStream<St>
where
    St: Stream<Item = anyhow::Result<(String, Vec<u8>)>>,
{
    type Item = Result<PendingClientEntry>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        let (key, bytes) = match ready!(this.underlying.as_mut().poll_next(cx)) {
            Some(Ok(item)) => item,
            Some(Err(err)) => {
                return Poll::Ready(Some(
                    Err(anyhow_to_eyre(err)).wrap_err("failed reading from state"),
                ));
            }
            None => return Poll::Ready(None),
        };
        Poll::Ready(Some(parse_entry(&key, &bytes)))
    }
}

fn parse_entry(key: &str, bytes: &[u8]) -> Result<PendingClientEntry> {
    let (spawn_time_nanos, chain_id) = keys::extract_spawn_time_and_chain_id(key)
        .wrap_err_with(|| format!("failed to parse pending client key `{key}`"))?;
    let spawn_time = timestamp_from_nanos(spawn_time_nanos)
        .wrap_err_with(|| format!("invalid spawn time in pending client key `{key}`"))?;
    let initial_height = StoredValue::deserialize(bytes)
        .and_then(|value| storage::PendingClient::try_from(value).map(Height::from))
        .wrap_err_with(|| format!("invalid pending client bytes under key `{key}`"))?;
    Ok(PendingClientEntry {
        spawn_time_nanos,
        spawn_time,
        info: PendingClientInfo {
            chain_id: chain_id.to_string(),
            initial_height,
        },
    })
}

#[async_trait]
pub(crate) trait StateReadExt: StateRead {
    /// Returns the initial height of the chain pending under `(spawn_time, chain_id)`.
    #[instrument(skip_all, fields(%spawn_time, %chain_id))]
    async fn get_pending_client_info(
        &self,
        spawn_time: Time,
        chain_id: &str,
    ) -> Result<Option<Height>> {
        let nanos = timestamp_nanos(spawn_time).wrap_err("spawn time precedes the unix epoch")?;
        let Some(bytes) = self
            .get_raw(&keys::pending_client(nanos, chain_id))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw pending client from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::PendingClient::try_from(value).map(Height::from))
            .map(Some)
            .wrap_err("invalid pending client bytes")
    }

    /// Returns the spawn time the chain is pending under, if it is pending.
    #[instrument(skip_all, fields(%chain_id))]
    async fn get_pending_spawn_time(&self, chain_id: &str) -> Result<Option<Time>> {
        let Some(bytes) = self
            .get_raw(&keys::pending_chain(chain_id))
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed reading raw pending spawn time from state")?
        else {
            return Ok(None);
        };
        StoredValue::deserialize(&bytes)
            .and_then(|value| storage::SpawnTime::try_from(value).map(Time::from))
            .map(Some)
            .wrap_err("invalid pending spawn time bytes")
    }

    #[instrument(skip_all)]
    fn pending_clients(&self) -> PendingClientsStream<Self::PrefixRawStream> {
        PendingClientsStream {
            underlying: self.prefix_raw(keys::PENDING_CLIENT_PREFIX),
        }
    }

    /// Returns all pending spawns with a spawn time at or before `now`.
    ///
    /// Iteration stops at the first entry lying after `now`.
    #[instrument(skip_all, fields(%now))]
    async fn get_due_pending_clients(&self, now: Time) -> Result<Vec<PendingClientEntry>> {
        let now_nanos = timestamp_nanos(now).wrap_err("block time precedes the unix epoch")?;
        let mut stream = pin!(self.pending_clients());
        let mut due = Vec::new();
        while let Some(entry) = stream
            .try_next()
            .await
            .wrap_err("failed reading pending clients")?
        {
            if entry.spawn_time_nanos > now_nanos {
                break;
            }
            due.push(entry);
        }
        Ok(due)
    }
}

impl<T: StateRead + ?Sized> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    /// Records a spawn request to be executed at `spawn_time`.
    ///
    /// An entry under the same `(spawn_time, chain_id)` is overwritten.
    #[instrument(skip_all, fields(%spawn_time, chain_id = %info.chain_id))]
    fn put_pending_client_info(&mut self, spawn_time: Time, info: &PendingClientInfo) -> Result<()> {
        let nanos = timestamp_nanos(spawn_time).wrap_err("spawn time precedes the unix epoch")?;
        let bytes = StoredValue::from(storage::PendingClient::from(info.initial_height))
            .serialize()
            .wrap_err("failed to serialize pending client")?;
        self.put_raw(keys::pending_client(nanos, &info.chain_id), bytes);

        let bytes = StoredValue::from(storage::SpawnTime::from(spawn_time))
            .serialize()
            .wrap_err("failed to serialize pending spawn time")?;
        self.put_raw(keys::pending_chain(&info.chain_id), bytes);
        Ok(())
    }

    /// Removes the pending entry and, if it still points at this entry, the chain's
    /// spawn time index.
    #[instrument(skip_all, fields(spawn_time = %entry.spawn_time, chain_id = %entry.info.chain_id))]
    async fn delete_pending_client(&mut self, entry: &PendingClientEntry) -> Result<()> {
        let chain_id = &entry.info.chain_id;
        self.delete(keys::pending_client(entry.spawn_time_nanos, chain_id));
        let indexed = self
            .get_pending_spawn_time(chain_id)
            .await
            .wrap_err("failed reading pending spawn time")?;
        if indexed == Some(entry.spawn_time) {
            self.delete(keys::pending_chain(chain_id));
        }
        Ok(())
    }

    /// Removes and returns all pending spawns due at `now`, in ascending order of
    /// spawn time and then chain ID.
    #[instrument(skip_all, fields(%now))]
    async fn take_due_pending_clients(&mut self, now: Time) -> Result<Vec<PendingClientEntry>> {
        let due = self
            .get_due_pending_clients(now)
            .await
            .wrap_err("failed collecting due pending clients")?;
        for entry in &due {
            self.delete_pending_client(entry)
                .await
                .wrap_err("failed deleting pending client")?;
        }
        Ok(due)
    }
}

impl<T: StateWrite> StateWriteExt for T {}
