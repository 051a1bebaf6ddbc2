//! Data API Gateway
//!
//! A stateless HTTP gateway in front of the FileMaker Data API. Callers send
//! a Basic credential plus an optional session token they hold from a
//! previous call; the gateway proves or re-establishes a backend session for
//! that single request, runs one record operation under it, and hands the
//! confirmed token back.
//!
//! ## Modules
//!
//! - [`auth`]: request gate and the session authenticator
//! - [`fm_client`]: Data API transport (login, validateSession, record calls)
//! - [`dispatch`]: the `POST /api/dataApi` handler and operation table
//! - [`records`]: Record Service operations
//! - [`config`]: configuration from file and environment
//! - [`error`]: HTTP error mapping

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod fm_client;
pub mod records;
pub mod result_ext;
pub mod routes;
pub mod state;

pub use error::{AppError, AppResult};
pub use result_ext::ResultExt;
