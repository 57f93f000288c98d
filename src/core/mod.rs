//! Core modules for Greeter

pub mod json;
pub mod cookie;
pub mod messages;
pub mod forms;
pub mod views;
pub mod api;

pub use json::{to_json, Document};
pub use self::cookie::SessionCodec;
pub use messages::{Lang, Messages};
pub use forms::{Constraint, DynamicForm};
pub use api::{create_router, run_server, serve, AppState, RouteMiss};
