use std::borrow::Cow;

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::client::v1::{
    ClientState,
    ConsensusState,
};
use eyre::{
    bail,
    WrapErr as _,
};

use crate::storage::StoredValue;

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(crate) struct Value<'a>(ValueImpl<'a>);

#[derive(Debug, BorshSerialize, BorshDeserialize)]
enum ValueImpl<'a> {
    ClientCounter(ClientCounter),
    ClientStateDocument(ClientStateDocument<'a>),
    ConsensusStateDocument(ConsensusStateDocument<'a>),
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::clients) struct ClientCounter(u64);

impl From<u64> for ClientCounter {
    fn from(counter: u64) -> Self {
        ClientCounter(counter)
    }
}

impl From<ClientCounter> for u64 {
    fn from(counter: ClientCounter) -> Self {
        counter.0
    }
}

impl From<ClientCounter> for StoredValue<'_> {
    fn from(counter: ClientCounter) -> Self {
        StoredValue::Clients(Value(ValueImpl::ClientCounter(counter)))
    }
}

impl<'a> TryFrom<StoredValue<'a>> for ClientCounter {
    type Error = eyre::Report;

    fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
        let StoredValue::Clients(Value(ValueImpl::ClientCounter(counter))) = value else {
            bail!("clients stored value type mismatch: expected client counter, found {value:?}");
        };
        Ok(counter)
    }
}

/// A light client descriptor, kept in the JSON form it is exchanged in.
#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::clients) struct ClientStateDocument<'a>(Cow<'a, str>);

impl<'a> TryFrom<&'a ClientState> for ClientStateDocument<'a> {
    type Error = eyre::Report;

    fn try_from(client_state: &'a ClientState) -> Result<Self, Self::Error> {
        serde_json::to_string(client_state)
            .map(|json| ClientStateDocument(Cow::Owned(json)))
            .wrap_err("failed to encode client state as json")
    }
}

impl<'a> TryFrom<ClientStateDocument<'a>> for ClientState {
    type Error = eyre::Report;

    fn try_from(document: ClientStateDocument<'a>) -> Result<Self, Self::Error> {
        serde_json::from_str(&document.0).wrap_err("failed to decode client state from json")
    }
}

impl<'a> From<ClientStateDocument<'a>> for StoredValue<'a> {
    fn from(document: ClientStateDocument<'a>) -> Self {
        StoredValue::Clients(Value(ValueImpl::ClientStateDocument(document)))
    }
}

impl<'a> TryFrom<StoredValue<'a>> for ClientStateDocument<'a> {
    type Error = eyre::Report;

    fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
        let StoredValue::Clients(Value(ValueImpl::ClientStateDocument(document))) = value else {
            bail!("clients stored value type mismatch: expected client state, found {value:?}");
        };
        Ok(document)
    }
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::clients) struct ConsensusStateDocument<'a>(Cow<'a, str>);

impl<'a> TryFrom<&'a ConsensusState> for ConsensusStateDocument<'a> {
    type Error = eyre::Report;

    fn try_from(consensus_state: &'a ConsensusState) -> Result<Self, Self::Error> {
        serde_json::to_string(consensus_state)
            .map(|json| ConsensusStateDocument(Cow::Owned(json)))
            .wrap_err("failed to encode consensus state as json")
    }
}

impl<'a> TryFrom<ConsensusStateDocument<'a>> for ConsensusState {
    type Error = eyre::Report;

    fn try_from(document: ConsensusStateDocument<'a>) -> Result<Self, Self::Error> {
        serde_json::from_str(&document.0).wrap_err("failed to decode consensus state from json")
    }
}

impl<'a> From<ConsensusStateDocument<'a>> for StoredValue<'a> {
    fn from(document: ConsensusStateDocument<'a>) -> Self {
        StoredValue::Clients(Value(ValueImpl::ConsensusStateDocument(document)))
    }
}

impl<'a> TryFrom<StoredValue<'a>> for ConsensusStateDocument<'a> {
    type Error = eyre::Report;

    fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
        let StoredValue::Clients(Value(ValueImpl::ConsensusStateDocument(document))) = value
        else {
            bail!("clients stored value type mismatch: expected consensus state, found {value:?}");
        };
        Ok(document)
    }
}
