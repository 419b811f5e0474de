//! Syntax tree of one fun-dsl call.

/// `name(key=value, ...)` as written, before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    /// Keyword parameters in source order. Duplicates are kept here and
    /// resolved (last wins) during evaluation.
    pub params: Vec<(String, Expr)>,
}

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    /// Bareword, resolved against the context.
    Ident(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    /// `base.a.b`, strict attribute chain.
    Attr { base: String, chain: Vec<String> },
    /// `base[k1][k2]`, lenient field chain.
    Field { base: String, keys: Vec<Expr> },
}

impl Expr {
    /// Whether the expression refers to the context anywhere.
    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) => true,
            Expr::Ident(_) | Expr::Attr { .. } | Expr::Field { .. } => false,
            Expr::List(items) | Expr::Tuple(items) => items.iter().all(Expr::is_literal),
            Expr::Dict(pairs) => pairs.iter().all(|(k, v)| k.is_literal() && v.is_literal()),
        }
    }
}
