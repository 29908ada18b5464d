mod error;
mod routes;

pub use error::{ApiError, ApiErrorBody, ApiResult};
pub use routes::{router, ApiState, ShardAccountResponse};
