use std::borrow::Cow;

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::parent::v1::Params;
use eyre::{
    bail,
    WrapErr as _,
};

use crate::storage::StoredValue;

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(crate) struct Value<'a>(ValueImpl<'a>);

#[derive(Debug, BorshSerialize, BorshDeserialize)]
enum ValueImpl<'a> {
    ParamsDocument(ParamsDocument<'a>),
}

/// The module parameters in their JSON genesis form.
#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::params) struct ParamsDocument<'a>(Cow<'a, str>);

impl<'a> TryFrom<&'a Params> for ParamsDocument<'a> {
    type Error = eyre::Report;

    fn try_from(params: &'a Params) -> Result<Self, Self::Error> {
        serde_json::to_string(params)
            .map(|json| ParamsDocument(Cow::Owned(json)))
            .wrap_err("failed to encode params as json")
    }
}

impl<'a> TryFrom<ParamsDocument<'a>> for Params {
    type Error = eyre::Report;

    fn try_from(document: ParamsDocument<'a>) -> Result<Self, Self::Error> {
        serde_json::from_str(&document.0).wrap_err("failed to decode params from json")
    }
}

impl<'a> From<ParamsDocument<'a>> for StoredValue<'a> {
    fn from(document: ParamsDocument<'a>) -> Self {
        StoredValue::Params(Value(ValueImpl::ParamsDocument(document)))
    }
}

impl<'a> TryFrom<StoredValue<'a>> for ParamsDocument<'a> {
    type Error = eyre::Report;

    fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
        let StoredValue::Params(Value(ValueImpl::ParamsDocument(document))) = value else {
            bail!("params stored value type mismatch: expected params, found {value:?}");
        };
        Ok(document)
    }
}
