mod error;
mod log;
pub mod midware;
pub mod routes;
mod serve;
pub mod types;

pub use error::{ClientError, Error, WebResult};
pub use serve::{app_router, serve};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
