pub mod child;
pub mod client;
pub mod governance;
pub mod parent;
