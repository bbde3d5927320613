use crate::Parameter;
use std::mem;

/// Clause being written, decides how columns and tables render.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlJoin,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUnionOrderBy,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
}

/// State carried while writing a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub fragment: Fragment,
    /// Qualify columns with their table even when it has no alias.
    pub qualify_columns: bool,
    /// Parameters collected so far, in placeholder order.
    pub params: Vec<Parameter>,
}

impl Context {
    pub fn new(fragment: Fragment, qualify_columns: bool) -> Self {
        Self {
            fragment,
            qualify_columns,
            params: Vec::new(),
        }
    }

    /// Number of placeholders written so far.
    pub fn counter(&self) -> usize {
        self.params.len()
    }

    /// Whether columns can carry a table qualifier in the current fragment.
    pub fn allows_qualified_columns(&self) -> bool {
        !matches!(
            self.fragment,
            Fragment::SqlInsertInto
                | Fragment::SqlInsertIntoValues
                | Fragment::SqlUpdate
                | Fragment::SqlUpdateSet
                | Fragment::SqlUpdateWhere
                | Fragment::SqlDeleteFrom
                | Fragment::SqlDeleteFromWhere
                | Fragment::SqlUnionOrderBy
        )
    }

    /// Enter `fragment`, the previous one is restored when the updater drops.
    pub fn switch_fragment<'s>(&'s mut self, fragment: Fragment) -> ContextUpdater<'s> {
        ContextUpdater {
            current: Context {
                fragment,
                qualify_columns: self.qualify_columns,
                params: mem::take(&mut self.params),
            },
            previous: self,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Fragment::None, false)
    }
}

pub struct ContextUpdater<'a> {
    pub current: Context,
    pub previous: &'a mut Context,
}

impl<'a> Drop for ContextUpdater<'a> {
    fn drop(&mut self) {
        self.previous.params = mem::take(&mut self.current.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parameter, Value};

    #[test]
    fn parameters_survive_fragment_switch() {
        let mut context = Context::new(Fragment::SqlSelect, false);
        {
            let mut updater = context.switch_fragment(Fragment::SqlSelectWhere);
            updater.current.qualify_columns = true;
            updater.current.params.push(Parameter::new(Some(1_i64)));
            assert_eq!(updater.current.counter(), 1);
        }
        assert_eq!(context.fragment, Fragment::SqlSelect);
        assert!(!context.qualify_columns);
        assert_eq!(context.params[0].value, Value::Int64(Some(1)));
    }
}
