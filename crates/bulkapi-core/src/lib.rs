pub mod descriptor;
pub mod evaluator;
pub mod ids;
pub mod request;
pub mod response;
pub mod results;
pub mod util;

pub use descriptor::{ExecutionClass, SubRequest};
pub use evaluator::{EvalError, Evaluator, ResolutionContext};
pub use request::BulkRequest;
pub use response::{Handler, HandlerError, Outcome, Responder};
pub use results::ResultSet;
