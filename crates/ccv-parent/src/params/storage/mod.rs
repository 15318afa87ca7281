pub(super) mod keys;
mod values;

pub(crate) use values::Value;
pub(super) use values::ParamsDocument;
