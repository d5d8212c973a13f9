//! Query construction: validated, immutable search requests.

mod builder;
mod fingerprint;
mod request;

pub use builder::{build, QueryBuilder};
pub use fingerprint::compute_hash;
pub use request::QueryRequest;
