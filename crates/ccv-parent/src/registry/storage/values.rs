use std::borrow::Cow;

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::{
    child::v1::GenesisState,
    client::v1::ClientId,
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
    ChildClientId(ChildClientId<'a>),
    ChildGenesisDocument(ChildGenesisDocument<'a>),
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::registry) struct ChildClientId<'a>(Cow<'a, str>);

impl<'a> From<&'a ClientId> for ChildClientId<'a> {
    fn from(client_id: &'a ClientId) -> Self {
        ChildClientId(Cow::Borrowed(client_id.as_str()))
    }
}

impl<'a> From<ChildClientId<'a>> for ClientId {
    fn from(client_id: ChildClientId<'a>) -> Self {
        ClientId::from(client_id.0.into_owned())
    }
}

/// The child's genesis in the canonical JSON form handed to its bootstrap tooling.
#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::registry) struct ChildGenesisDocument<'a>(Cow<'a, str>);

impl TryFrom<&GenesisState> for ChildGenesisDocument<'_> {
    type Error = eyre::Report;

    fn try_from(genesis: &GenesisState) -> Result<Self, Self::Error> {
        genesis
            .to_json()
            .map(|json| ChildGenesisDocument(Cow::Owned(json)))
            .wrap_err("failed to encode child genesis as json")
    }
}

impl<'a> TryFrom<ChildGenesisDocument<'a>> for GenesisState {
    type Error = eyre::Report;

    fn try_from(document: ChildGenesisDocument<'a>) -> Result<Self, Self::Error> {
        GenesisState::from_json(&document.0).wrap_err("failed to decode child genesis from json")
    }
}

macro_rules! impl_stored_value {
    ($($variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$variant<'a>> for StoredValue<'a> {
                fn from(value: $variant<'a>) -> Self {
                    StoredValue::Registry(Value(ValueImpl::$variant(value)))
                }
            }

            impl<'a> TryFrom<StoredValue<'a>> for $variant<'a> {
                type Error = eyre::Report;

                fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
                    let StoredValue::Registry(Value(ValueImpl::$variant(value))) = value else {
                        bail!(
                            "registry stored value type mismatch: expected {}, found {value:?}",
                            stringify!($variant),
                        );
                    };
                    Ok(value)
                }
            }
        )*
    };
}

impl_stored_value!(ChildClientId, ChildGenesisDocument);
