//! Front gateway: `POST /` with `{"cep": "..."}` is re-validated and forwarded
//! to the orchestrator, whose answer is relayed verbatim.

pub mod error;
pub mod forward;
pub mod routes;

pub use error::GatewayError;
pub use forward::{Forwarded, OrchestratorClient};
pub use routes::router;
