//! GitHub API invocation for hubcall.
//!
//! Commands describe a call with a [`RequestDescriptor`] or
//! [`GraphQLRequest`] and hand it to an [`Invoker`], which resolves the
//! host and token, performs the call, follows pagination and turns every
//! failure into an [`ApiError`].

pub mod auth;
pub mod errors;
pub mod http;
pub mod invoker;
pub mod pagination;
pub mod request;
pub mod telemetry;

pub use errors::{ApiError, ErrorCategory, RequestTarget, TransportKind};
pub use invoker::{Invoker, RestResponse};
pub use request::{GraphQLRequest, Method, RequestDescriptor};
pub use telemetry::{NoopTelemetry, TelemetrySink, TracingTelemetry};
