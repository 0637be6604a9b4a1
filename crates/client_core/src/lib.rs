//! Client side of the SRS admin tools: the REST client, list and delete
//! flows, and configuration shared by the CLI and the desktop app.

pub mod activity;
pub mod api;
pub mod config;
pub mod confirm;
pub mod error;
pub mod list_view;

pub use api::{ApiResult, SrsApi, SrsClient};
pub use config::ClientConfig;
pub use confirm::{DeleteFlow, DeleteTicket};
pub use error::ClientError;
pub use forms::notice;
pub use list_view::{FetchTicket, ListController, ListPage, Pagination};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod flow_tests;
