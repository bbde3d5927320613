use crate::{Expression, Failure, Result, WireType};

/// `CASE [value] WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone)]
pub struct Case {
    /// Present for the value form, compared against every `WHEN` operand.
    pub operand: Option<Expression>,
    pub branches: Vec<(Expression, Expression)>,
    pub otherwise: Option<Expression>,
    pub value_type: Option<WireType>,
}

impl Case {
    pub fn new(
        operand: Option<Expression>,
        branches: Vec<(Expression, Expression)>,
        otherwise: Option<Expression>,
    ) -> Result<Self> {
        let Some((_, first)) = branches.first() else {
            return Err(Failure::construction("A case expression needs at least one branch"));
        };
        let value_type = first
            .value_type()
            .or_else(|| otherwise.as_ref().and_then(Expression::value_type));
        Ok(Self {
            operand,
            branches,
            otherwise,
            value_type,
        })
    }

    /// Start a boolean branch case: `CASE WHEN condition THEN result`.
    pub fn when(condition: impl Into<Expression>, result: impl Into<Expression>) -> CaseBuilder {
        CaseBuilder {
            operand: None,
            branches: vec![(condition.into(), result.into())],
            otherwise: None,
        }
    }

    /// Start a value case: `CASE value`, branches are added with `CaseBuilder::when`.
    pub fn value(operand: impl Into<Expression>) -> CaseBuilder {
        CaseBuilder {
            operand: Some(operand.into()),
            branches: Vec::new(),
            otherwise: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaseBuilder {
    operand: Option<Expression>,
    branches: Vec<(Expression, Expression)>,
    otherwise: Option<Expression>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: impl Into<Expression>, result: impl Into<Expression>) -> Self {
        self.branches.push((condition.into(), result.into()));
        self
    }

    pub fn otherwise(mut self, result: impl Into<Expression>) -> Self {
        self.otherwise = Some(result.into());
        self
    }

    pub fn build(self) -> Result<Expression> {
        Case::new(self.operand, self.branches, self.otherwise).map(Into::into)
    }
}
