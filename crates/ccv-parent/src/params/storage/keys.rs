pub(in crate::params) const PARAMS: &str = "parent/params";
