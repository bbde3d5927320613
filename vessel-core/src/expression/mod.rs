mod assignment;
mod binary_op;
mod case;
mod expression;
mod function;
mod in_list;
mod join;
mod operand;
mod ordered;
mod tuple;
mod unary_op;

pub use assignment::*;
pub use binary_op::*;
pub use case::*;
pub use expression::*;
pub use function::*;
pub use in_list::*;
pub use join::*;
pub use operand::*;
pub use ordered::*;
pub use tuple::*;
pub use unary_op::*;
