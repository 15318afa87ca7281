use std::{
    pin::Pin,
    task::{
        ready,
        Context,
        Poll,
    },
};

use async_trait::async_trait;
use ccv_core::protocol::child::v1::UnbondingSequence;
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
use tracing::instrument;

use super::storage::{
    self,
    keys,
};
use crate::{
    storage::StoredValue,
    utils::anyhow_to_eyre,
};

pin_project! {
    /// Unbonding sequences in ascending order of their sequence numbers.
    pub(crate) struct UnbondingSequencesStream<St> {
        #[pin]
        underlying: St,
    }
}

impl<St> Stream for UnbondingSequencesStream<St>
where
    St: Stream<Item = anyhow::Result<(String, Vec<u8>)>>,
{
    type Item = Result<UnbondingSequence>;

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
        let sequence = StoredValue::deserialize(&bytes)
            .and_then(|value| {
                storage::UnbondingSequence::try_from(value).map(UnbondingSequence::from)
            })
            .wrap_err_with(|| format!("invalid unbonding sequence bytes under key `{key}`"));
        Poll::Ready(Some(sequence))
    }
}

#[async_trait]
pub(crate) trait StateReadExt: StateRead {
    #[instrument(skip_all)]
    fn unbonding_sequences(&self) -> UnbondingSequencesStream<Self::PrefixRawStream> {
        UnbondingSequencesStream {
            underlying: self.prefix_raw(keys::UNBONDING_PREFIX),
        }
    }

    /// Collects all outstanding unbonding sequences, ordered by sequence number.
    #[instrument(skip_all)]
    async fn get_unbonding_sequences(&self) -> Result<Vec<UnbondingSequence>> {
        self.unbonding_sequences()
            .try_collect()
            .await
            .wrap_err("failed collecting unbonding sequences")
    }
}

impl<T: StateRead + ?Sized> StateReadExt for T {}

#[async_trait]
pub(crate) trait StateWriteExt: StateWrite {
    /// Records an unbonding operation, replacing any record with the same sequence.
    #[instrument(skip_all, fields(sequence = sequence.unbonding_sequence))]
    fn put_unbonding_sequence(&mut self, sequence: UnbondingSequence) -> Result<()> {
        let key = keys::unbonding_sequence(sequence.unbonding_sequence);
        let bytes = StoredValue::from(storage::UnbondingSequence::from(sequence))
            .serialize()
            .wrap_err("failed to serialize unbonding sequence")?;
        self.put_raw(key, bytes);
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_unbonding_sequence(&mut self, sequence: u64) {
        self.delete(keys::unbonding_sequence(sequence));
    }
}

impl<T: StateWrite> StateWriteExt for T {}
