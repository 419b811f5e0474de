//! Functions available to every page.
//!
//! | name    | produces                                 |
//! |---------|------------------------------------------|
//! | `line`  | Chart.js line plot, needs the bundle     |
//! | `bar`   | Chart.js bar plot, needs the bundle      |
//! | `table` | `<table>` from a list of rows or a dict  |
//!
//! `link(to, text?)` is added per page when a document tree is rendered,
//! since it depends on where the calling page lives.

pub mod plot;
pub mod table;

use crate::preprocess::FunctionTable;

pub use plot::CHART_JS;

/// The shared builtin table.
pub fn builtin_functions() -> FunctionTable<'static> {
    let mut functions = FunctionTable::new();
    functions
        .register("line", plot::line)
        .register("bar", plot::bar)
        .register("table", table::table);
    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundsl::Context;
    use crate::preprocess::Preprocessor;

    #[test]
    fn test_builtin_names() {
        assert_eq!(builtin_functions().names(), vec!["bar", "line", "table"]);
    }

    #[test]
    fn test_builtins_through_preprocessor() {
        let functions = builtin_functions();
        let context = Context::from_json(serde_json::json!({"sales": [3, 1, 2]})).unwrap();
        let processed = Preprocessor::new(&functions, &context)
            .process("%$ line(y=sales) $%\n%$ table(rows=[[1, 2]]) $%")
            .into_result()
            .unwrap();

        assert_eq!(processed.segments.len(), 2);
        assert_eq!(processed.resources(), vec![CHART_JS]);
    }
}
