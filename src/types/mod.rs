//! Core types for Greeter

mod session;
mod node;
mod validation;
mod content;

pub use session::Session;
pub use node::{Node, NodeKind, Scalar};
pub use validation::{ErrorCode, ValidationError, FormErrors};
pub use content::Content;
