pub mod display;
pub mod node;

pub use self::{display::Precedence, node::AstNode};
