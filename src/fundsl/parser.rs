//! Recursive-descent parser for fun-dsl calls.
//!
//! # Grammar
//!
//! ```text
//! function_call  := IDENT "(" keyword_params ")"
//! keyword_params := (keyword_param ("," keyword_param)* ","?)?
//! keyword_param  := IDENT "=" value
//! value          := IDENT | INT | FLOAT | STRING | list | tuple | dict
//!                 | field_accessor | attr_accessor
//! list           := "[" (value ("," value)* ","?)? "]"
//! tuple          := "(" (value ("," value)* ","?)? ")"
//! dict           := "{" (dict_pair ("," dict_pair)* ","?)? "}"
//! dict_pair      := scalar ":" value
//! scalar         := INT | FLOAT | STRING | tuple
//! attr_accessor  := IDENT ("." IDENT)+
//! field_accessor := IDENT ("[" scalar "]")+
//! ```

use super::DslError;
use super::ast::{CallExpr, Expr};
use super::token::{Span, Token, tokenize};

type Result<T> = std::result::Result<T, DslError>;

/// Parse a complete call. Trailing tokens after the closing `)` are an error.
pub fn parse_call(source: &str) -> Result<CallExpr> {
    let mut parser = Parser::new(source)?;
    let call = parser.function_call()?;
    parser.expect_end()?;
    Ok(call)
}

/// Parse a single value expression.
pub fn parse_value(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let value = parser.value()?;
    parser.expect_end()?;
    Ok(value)
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
    /// Offset reported for errors at end of input.
    end: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            end: source.len(),
        })
    }

    // ------------------------------------------------------------------------
    // Productions
    // ------------------------------------------------------------------------

    fn function_call(&mut self) -> Result<CallExpr> {
        let name = self.ident("function name")?;
        self.expect(Token::LParen, "`(`")?;
        let params = self.sequence(Token::RParen, "`,` or `)`", Self::keyword_param)?;
        Ok(CallExpr {
            name: name.to_owned(),
            params,
        })
    }

    fn keyword_param(&mut self) -> Result<(String, Expr)> {
        let key = self.ident("parameter name")?;
        self.expect(Token::Equals, "`=`")?;
        Ok((key.to_owned(), self.value()?))
    }

    fn value(&mut self) -> Result<Expr> {
        let offset = self.offset();
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("a value"));
        };
        match token {
            Token::Ident(name) => {
                self.pos += 1;
                self.accessor(name)
            }
            Token::Int(_) | Token::Float(_) | Token::Str(_) | Token::LParen => self.scalar(),
            Token::LBracket => {
                self.pos += 1;
                let items = self.sequence(Token::RBracket, "`,` or `]`", Self::value)?;
                Ok(Expr::List(items))
            }
            Token::LBrace => {
                self.pos += 1;
                let pairs = self.sequence(Token::RBrace, "`,` or `}`", Self::dict_pair)?;
                Ok(Expr::Dict(pairs))
            }
            _ => Err(DslError::Syntax {
                message: format!("expected a value, found {token}"),
                offset,
            }),
        }
    }

    /// Dict keys and field indexes.
    fn scalar(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.peek().cloned() {
            Some(Token::Int(text)) => {
                self.pos += 1;
                text.parse().map(Expr::Int).map_err(|_| DslError::Syntax {
                    message: format!("integer literal `{text}` out of range"),
                    offset,
                })
            }
            Some(Token::Float(text)) => {
                self.pos += 1;
                text.parse().map(Expr::Float).map_err(|_| DslError::Syntax {
                    message: format!("invalid decimal literal `{text}`"),
                    offset,
                })
            }
            Some(Token::Str(text)) => {
                self.pos += 1;
                Ok(Expr::Str(text.to_owned()))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let items = self.sequence(Token::RParen, "`,` or `)`", Self::value)?;
                Ok(Expr::Tuple(items))
            }
            _ => Err(self.error("a number, string or tuple")),
        }
    }

    fn dict_pair(&mut self) -> Result<(Expr, Expr)> {
        let key = self.scalar()?;
        self.expect(Token::Colon, "`:`")?;
        Ok((key, self.value()?))
    }

    /// Continue an identifier into an attribute or field chain, if any.
    fn accessor(&mut self, base: &str) -> Result<Expr> {
        match self.peek() {
            Some(Token::Dot) => {
                let mut chain = Vec::new();
                while self.eat(&Token::Dot) {
                    chain.push(self.ident("attribute name")?.to_owned());
                }
                Ok(Expr::Attr {
                    base: base.to_owned(),
                    chain,
                })
            }
            Some(Token::LBracket) => {
                let mut keys = Vec::new();
                while self.eat(&Token::LBracket) {
                    keys.push(self.scalar()?);
                    self.expect(Token::RBracket, "`]`")?;
                }
                Ok(Expr::Field {
                    base: base.to_owned(),
                    keys,
                })
            }
            _ => Ok(Expr::Ident(base.to_owned())),
        }
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    /// Comma separated items, consuming the closing token. Trailing comma allowed.
    fn sequence<T>(
        &mut self,
        close: Token<'src>,
        expected: &str,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(item(self)?);
            if self.eat(&close) {
                return Ok(items);
            }
            if !self.eat(&Token::Comma) {
                return Err(self.error(expected));
            }
        }
    }

    fn ident(&mut self, expected: &str) -> Result<&'src str> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = *name;
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error(expected)),
        }
    }

    fn expect(&mut self, token: Token<'src>, expected: &str) -> Result<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("end of call")),
        }
    }

    fn eat(&mut self, token: &Token<'src>) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |(_, span)| span.start)
    }

    fn error(&self, expected: &str) -> DslError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_owned(), ToString::to_string);
        DslError::Syntax {
            message: format!("expected {expected}, found {found}"),
            offset: self.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_owned())
    }

    fn syntax_offset(result: Result<impl std::fmt::Debug>) -> usize {
        match result {
            Err(DslError::Syntax { offset, .. }) => offset,
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    #[test]
    fn test_scalars() {
        assert_eq!(parse_value("10").unwrap(), Expr::Int(10));
        assert_eq!(parse_value("-10").unwrap(), Expr::Int(-10));
        assert_eq!(parse_value("3.14").unwrap(), Expr::Float(3.14));
        assert_eq!(parse_value("-3.14").unwrap(), Expr::Float(-3.14));
        assert_eq!(parse_value("\"alpha\"").unwrap(), Expr::Str("alpha".into()));
        assert_eq!(parse_value("'alpha'").unwrap(), Expr::Str("alpha".into()));
        assert_eq!(parse_value("q").unwrap(), ident("q"));
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            parse_value("[1,2,3]").unwrap(),
            Expr::List(vec![Expr::Int(1), Expr::Int(2), Expr::Int(3)])
        );
        assert_eq!(
            parse_value("(1, 'a')").unwrap(),
            Expr::Tuple(vec![Expr::Int(1), Expr::Str("a".into())])
        );
        assert_eq!(
            parse_value("{1:2, 3:{4:q}}").unwrap(),
            Expr::Dict(vec![
                (Expr::Int(1), Expr::Int(2)),
                (
                    Expr::Int(3),
                    Expr::Dict(vec![(Expr::Int(4), ident("q"))])
                ),
            ])
        );
        assert_eq!(parse_value("[]").unwrap(), Expr::List(vec![]));
        assert_eq!(parse_value("()").unwrap(), Expr::Tuple(vec![]));
        assert_eq!(parse_value("{}").unwrap(), Expr::Dict(vec![]));
    }

    #[test]
    fn test_trailing_comma_accepted() {
        assert_eq!(
            parse_value("[1,2,]").unwrap(),
            Expr::List(vec![Expr::Int(1), Expr::Int(2)])
        );
        assert_eq!(parse_call("f(a=1,)").unwrap().params.len(), 1);
    }

    #[test]
    fn test_tuple_dict_key() {
        assert_eq!(
            parse_value("{(1,2):'x'}").unwrap(),
            Expr::Dict(vec![(
                Expr::Tuple(vec![Expr::Int(1), Expr::Int(2)]),
                Expr::Str("x".into())
            )])
        );
    }

    #[test]
    fn test_list_is_not_a_dict_key() {
        assert!(parse_value("{[1]:2}").is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(
            parse_value("page.meta.title").unwrap(),
            Expr::Attr {
                base: "page".into(),
                chain: vec!["meta".into(), "title".into()],
            }
        );
        assert_eq!(
            parse_value("data['series'][0]").unwrap(),
            Expr::Field {
                base: "data".into(),
                keys: vec![Expr::Str("series".into()), Expr::Int(0)],
            }
        );
    }

    #[test]
    fn test_missing_comma_between_items() {
        assert_eq!(syntax_offset(parse_value("[1 2]")), 3);
    }

    #[test]
    fn test_integer_overflow() {
        assert!(parse_value("99999999999999999999").is_err());
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    #[test]
    fn test_call() {
        let call = parse_call("blah(alpha=1,beta=2)").unwrap();
        assert_eq!(call.name, "blah");
        assert_eq!(
            call.params,
            vec![
                ("alpha".to_owned(), Expr::Int(1)),
                ("beta".to_owned(), Expr::Int(2)),
            ]
        );
    }

    #[test]
    fn test_call_without_params() {
        let call = parse_call("toc()").unwrap();
        assert_eq!(call.name, "toc");
        assert!(call.params.is_empty());
    }

    #[test]
    fn test_duplicate_params_are_kept_in_order() {
        let call = parse_call("f(a=1, a=2)").unwrap();
        assert_eq!(call.params.len(), 2);
        assert_eq!(call.params[1].1, Expr::Int(2));
    }

    #[test]
    fn test_empty_source_is_error() {
        assert_eq!(syntax_offset(parse_call("")), 0);
        assert_eq!(syntax_offset(parse_call("   ")), 3);
    }

    #[test]
    fn test_positional_param_rejected() {
        assert_eq!(syntax_offset(parse_call("f(1)")), 2);
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_call("f(a=1) g").unwrap_err();
        assert!(err.to_string().contains("end of call"));
    }

    #[test]
    fn test_unclosed_call() {
        let err = parse_call("f(a=1").unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }
}
