//! A declarative REST client engine: service methods are described once via
//! [`operation::RestOperation`] and [`descriptor::MethodDescriptor`], then
//! dispatched through a [`pipeline::Pipeline`] of composable request
//! policies terminating in a [`transport::Transport`].

pub mod codec;
pub mod config;
pub mod cookie;
pub mod descriptor;
pub mod error;
pub mod facade;
pub mod model;
pub mod operation;
pub mod pipeline;
pub mod registry;
pub mod request_builder;
pub mod response;
pub mod retry;
pub mod transport;
pub mod url_builder;
pub mod wire;

pub use config::{ClientConfig, ClientConfigBuilder, Credential};
pub use error::{ClientError, ClientResult};
pub use facade::{CallOutcome, Client};
pub use operation::{BodyValue, Envelope, HeadersSpec, NamedArg, RestOperation};
