/*
[INPUT]:  Caller-supplied request parameters
[OUTPUT]: Typed query values shared by the HTTP and auth layers
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When request-side types are added
*/

pub mod query;

pub use query::{Query, QueryValue};
