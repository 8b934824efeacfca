//! Use cases (application services)

pub mod chat_client;
pub mod reconcile;
pub mod search;
pub mod session_list;

#[cfg(test)]
pub(crate) mod testing;
