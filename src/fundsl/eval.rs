//! Evaluation of parsed calls against a [`Context`].

use super::ast::{CallExpr, Expr};
use super::value::{Accessible, Context, KwArgs, Map, Value};
use super::{DslError, parse_call};

/// A call with every parameter evaluated, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function_name: String,
    pub parameters: KwArgs,
}

impl Call {
    /// Parse and evaluate `source` in one step.
    pub fn from_source(source: &str, context: &Context) -> Result<Self, DslError> {
        Evaluator::new(context).call(&parse_call(source)?)
    }
}

/// Converts expressions into values bottom-up.
///
/// Evaluation never mutates the context, so a call made only of literals
/// always produces the same result.
pub struct Evaluator<'c> {
    context: &'c Context,
}

impl<'c> Evaluator<'c> {
    pub fn new(context: &'c Context) -> Self {
        Self { context }
    }

    pub fn call(&self, expr: &CallExpr) -> Result<Call, DslError> {
        let mut parameters = KwArgs::new();
        for (name, value) in &expr.params {
            parameters.insert(name.clone(), self.value(value)?);
        }
        Ok(Call {
            function_name: expr.name.clone(),
            parameters,
        })
    }

    pub fn value(&self, expr: &Expr) -> Result<Value, DslError> {
        Ok(match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Float(x) => Value::Float(*x),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Ident(name) => self.lookup(name)?.clone(),
            Expr::List(items) => Value::List(self.values(items)?),
            Expr::Tuple(items) => Value::Tuple(self.values(items)?),
            Expr::Dict(pairs) => {
                let mut map = Map::new();
                for (k, v) in pairs {
                    map.insert(self.value(k)?, self.value(v)?);
                }
                Value::Map(map)
            }
            Expr::Attr { base, chain } => {
                let mut current = self.lookup(base)?.clone();
                let mut path = base.clone();
                for attr in chain {
                    current = current
                        .get_attr(attr)
                        .ok_or_else(|| DslError::AttributeNotFound {
                            path: path.clone(),
                            attr: attr.clone(),
                        })?;
                    path.push('.');
                    path.push_str(attr);
                }
                current
            }
            Expr::Field { base, keys } => {
                let mut current = self.lookup(base)?.clone();
                for key in keys {
                    let key = self.value(key)?;
                    current = current.get_field(&key).unwrap_or_default();
                }
                current
            }
        })
    }

    fn values(&self, items: &[Expr]) -> Result<Vec<Value>, DslError> {
        items.iter().map(|item| self.value(item)).collect()
    }

    fn lookup(&self, name: &str) -> Result<&'c Value, DslError> {
        self.context
            .get(name)
            .ok_or_else(|| DslError::VariableNotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::from_json(json!({
            "q": 10,
            "report": {"meta": {"title": "Q3"}},
            "data": {"series": [1, 2, 3]},
        }))
        .unwrap()
    }

    fn eval(source: &str) -> Result<Call, DslError> {
        Call::from_source(source, &ctx())
    }

    #[test]
    fn test_literal_params() {
        let call = eval("blah(alpha=1,beta=2)").unwrap();
        assert_eq!(call.function_name, "blah");
        assert_eq!(call.parameters.get("alpha"), Some(&Value::Int(1)));
        assert_eq!(call.parameters.get("beta"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_nested_dict_with_variable() {
        let call = eval("f(a={1:2, 3:{4:q}})").unwrap();
        let outer = call.parameters.get("a").unwrap().as_map().unwrap();
        assert_eq!(outer.get(&Value::Int(1)), Some(&Value::Int(2)));
        let inner = outer.get(&Value::Int(3)).unwrap().as_map().unwrap();
        assert_eq!(inner.get(&Value::Int(4)), Some(&Value::Int(10)));
    }

    #[test]
    fn test_strings_are_unquoted() {
        let call = eval("f(a='alpha', b=\"beta\")").unwrap();
        assert_eq!(call.parameters.str("a").unwrap(), "alpha");
        assert_eq!(call.parameters.str("b").unwrap(), "beta");
    }

    #[test]
    fn test_duplicate_param_last_wins() {
        let call = eval("f(a=1, a=2)").unwrap();
        assert_eq!(call.parameters.len(), 1);
        assert_eq!(call.parameters.get("a"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_unknown_variable() {
        assert!(matches!(
            eval("f(a=missing)"),
            Err(DslError::VariableNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_attr_chain_is_strict() {
        let call = eval("f(t=report.meta.title)").unwrap();
        assert_eq!(call.parameters.str("t").unwrap(), "Q3");

        match eval("f(t=report.meta.author)") {
            Err(DslError::AttributeNotFound { path, attr }) => {
                assert_eq!(path, "report.meta");
                assert_eq!(attr, "author");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_field_chain_is_lenient() {
        let call = eval("f(a=data['series'][1], b=data['nope'][0])").unwrap();
        assert_eq!(call.parameters.get("a"), Some(&Value::Int(2)));
        assert_eq!(call.parameters.get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_literal_call_is_pure() {
        let empty = Context::new();
        let first = Call::from_source("f(x=[1, (2, 'a')], y=2.5)", &empty).unwrap();
        let second = Call::from_source("f(x=[1, (2, 'a')], y=2.5)", &empty).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_syntax_error_surfaces_before_lookup() {
        assert!(matches!(eval("f(a=missing"), Err(DslError::Syntax { .. })));
    }
}
