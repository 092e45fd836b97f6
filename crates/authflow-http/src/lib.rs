//! HTTP capability for authflow.
//!
//! [`Request`] is the mutable builder every module shapes during a step,
//! [`Response`] is the immutable result of the transport call, and
//! [`HttpClient`] is the seam the transport module sends through.

mod client;
mod error;
mod request;
mod response;

pub use client::{HttpClient, ReqwestClient};
pub use error::HttpError;
pub use request::{Body, Request};
pub use reqwest::Method;
pub use response::Response;
