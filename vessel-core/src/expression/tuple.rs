use crate::{Expression, Failure, Result};

/// `(e1, e2, ...)`, a single element renders bare.
#[derive(Debug, Clone)]
pub struct Tuple(Vec<Expression>);

impl Tuple {
    pub fn new(elements: impl IntoIterator<Item = Expression>) -> Result<Self> {
        let elements: Vec<_> = elements.into_iter().collect();
        if elements.is_empty() {
            return Err(Failure::construction("A tuple needs at least one element"));
        }
        Ok(Self(elements))
    }

    pub fn elements(&self) -> &[Expression] {
        &self.0
    }
}
