use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use eyre::{
    Result,
    WrapErr as _,
};

/// The envelope of every value written to state by this crate.
#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(crate) enum StoredValue<'a> {
    App(crate::app::storage::Value<'a>),
    Clients(crate::clients::storage::Value<'a>),
    Params(crate::params::storage::Value<'a>),
    Pending(crate::pending::storage::Value),
    Registry(crate::registry::storage::Value<'a>),
    Unbonding(crate::unbonding::storage::Value),
}

impl<'a> StoredValue<'a> {
    pub(crate) fn serialize(&self) -> Result<Vec<u8>> {
        borsh::to_vec(&self).wrap_err("failed to serialize stored value")
    }

    pub(crate) fn deserialize(bytes: &[u8]) -> Result<Self> {
        borsh::from_slice(bytes).wrap_err("failed to deserialize stored value")
    }
}
