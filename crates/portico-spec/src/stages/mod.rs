//! The middleware stages that [`with_route_spec`](crate::with_route_spec)
//! composes: documentation registration, per-target input validation,
//! response validation, and the terminal handler.

mod describe;
mod handler;
mod input;
mod response;

pub use describe::DescribeRouteStage;
pub use handler::{Handler, HandlerStage};
pub use input::InputValidationStage;
pub use response::ResponseValidationStage;
