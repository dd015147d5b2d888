//! Filter parser.
//!
//! Parses SQL-style boolean expressions with sqlparser and converts them to
//! the closed [`Expr`] tree. Fields may be written `row.name`, `data.name`
//! or plain `name`. Strings are single-quoted.

use serde_json::Value;
use sqlparser::ast as sp;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser as SqlParser;
use sqlparser::tokenizer::Token;

use super::ast::{CompareOp, Expr};
use super::error::{PredicateError, PredicateResult};

/// Names that refer to the row itself when used as a path prefix.
const ROW_ALIASES: [&str; 2] = ["row", "data"];

/// Filter parser.
pub struct PredicateParser;

impl PredicateParser {
    /// Parse filter text into an expression tree.
    pub fn parse(text: &str) -> PredicateResult<Expr> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PredicateError::Syntax("empty filter".into()));
        }

        let dialect = GenericDialect {};
        let mut parser = SqlParser::new(&dialect).try_with_sql(text)?;
        let expr = parser.parse_expr()?;

        let next = parser.peek_token();
        if next.token != Token::EOF {
            return Err(PredicateError::Syntax(format!(
                "unexpected {} after expression",
                next.token
            )));
        }

        Self::convert_expr(&expr)
    }

    fn convert_expr(expr: &sp::Expr) -> PredicateResult<Expr> {
        match expr {
            sp::Expr::Identifier(id) => Ok(Expr::Field(vec![id.value.clone()])),

            sp::Expr::CompoundIdentifier(parts) => {
                let mut path: Vec<String> = parts.iter().map(|p| p.value.clone()).collect();
                if path.len() > 1 && ROW_ALIASES.iter().any(|a| path[0].eq_ignore_ascii_case(a)) {
                    path.remove(0);
                }
                Ok(Expr::Field(path))
            }

            sp::Expr::Value(v) => Ok(Expr::Literal(Self::convert_value(&v.value)?)),

            sp::Expr::BinaryOp { left, op, right } => {
                let l = Self::convert_expr(left)?;
                let r = Self::convert_expr(right)?;
                match op {
                    sp::BinaryOperator::And => Ok(Expr::And(Box::new(l), Box::new(r))),
                    sp::BinaryOperator::Or => Ok(Expr::Or(Box::new(l), Box::new(r))),
                    other => Ok(Expr::compare(l, Self::convert_compare_op(other)?, r)),
                }
            }

            sp::Expr::UnaryOp { op, expr } => match op {
                sp::UnaryOperator::Not => Ok(Expr::Not(Box::new(Self::convert_expr(expr)?))),
                sp::UnaryOperator::Plus => Self::convert_expr(expr),
                sp::UnaryOperator::Minus => match Self::convert_expr(expr)? {
                    Expr::Literal(Value::Number(n)) => Ok(Expr::Literal(Self::negate(&n)?)),
                    _ => Err(PredicateError::Unsupported(
                        "unary minus on a non-numeric operand".into(),
                    )),
                },
                other => Err(PredicateError::Unsupported(format!("operator {}", other))),
            },

            sp::Expr::IsNull(e) => Ok(Expr::IsNull {
                expr: Box::new(Self::convert_expr(e)?),
                negated: false,
            }),

            sp::Expr::IsNotNull(e) => Ok(Expr::IsNull {
                expr: Box::new(Self::convert_expr(e)?),
                negated: true,
            }),

            sp::Expr::InList { expr, list, negated } => Ok(Expr::InList {
                expr: Box::new(Self::convert_expr(expr)?),
                list: list.iter().map(Self::convert_expr).collect::<PredicateResult<_>>()?,
                negated: *negated,
            }),

            sp::Expr::Between { expr, low, high, negated } => Ok(Expr::Between {
                expr: Box::new(Self::convert_expr(expr)?),
                low: Box::new(Self::convert_expr(low)?),
                high: Box::new(Self::convert_expr(high)?),
                negated: *negated,
            }),

            sp::Expr::Like { expr, pattern, negated, .. } => Ok(Expr::Like {
                expr: Box::new(Self::convert_expr(expr)?),
                pattern: Self::extract_pattern(pattern)?,
                negated: *negated,
            }),

            sp::Expr::Nested(inner) => Self::convert_expr(inner),

            other => Err(PredicateError::Unsupported(other.to_string())),
        }
    }

    fn convert_value(v: &sp::Value) -> PredicateResult<Value> {
        match v {
            sp::Value::Null => Ok(Value::Null),
            sp::Value::Boolean(b) => Ok(Value::Bool(*b)),
            sp::Value::Number(s, _) => {
                if let Ok(i) = s.parse::<i64>() {
                    Ok(Value::from(i))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(|| PredicateError::Syntax(format!("invalid number: {}", s)))
                }
            }
            sp::Value::SingleQuotedString(s) => Ok(Value::String(s.clone())),
            other => Err(PredicateError::Unsupported(format!("literal {}", other))),
        }
    }

    fn negate(n: &serde_json::Number) -> PredicateResult<Value> {
        if let Some(i) = n.as_i64() {
            return Ok(Value::from(-i));
        }
        n.as_f64()
            .and_then(|f| serde_json::Number::from_f64(-f))
            .map(Value::Number)
            .ok_or_else(|| PredicateError::Syntax(format!("cannot negate {}", n)))
    }

    fn extract_pattern(expr: &sp::Expr) -> PredicateResult<String> {
        match expr {
            sp::Expr::Value(v) => match &v.value {
                sp::Value::SingleQuotedString(s) => Ok(s.clone()),
                _ => Err(PredicateError::Unsupported("LIKE pattern must be a string".into())),
            },
            _ => Err(PredicateError::Unsupported("LIKE pattern must be a string literal".into())),
        }
    }

    fn convert_compare_op(op: &sp::BinaryOperator) -> PredicateResult<CompareOp> {
        match op {
            sp::BinaryOperator::Eq => Ok(CompareOp::Eq),
            sp::BinaryOperator::NotEq => Ok(CompareOp::NotEq),
            sp::BinaryOperator::Lt => Ok(CompareOp::Lt),
            sp::BinaryOperator::LtEq => Ok(CompareOp::LtEq),
            sp::BinaryOperator::Gt => Ok(CompareOp::Gt),
            sp::BinaryOperator::GtEq => Ok(CompareOp::GtEq),
            other => Err(PredicateError::Unsupported(format!("operator {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_prefixed_field() {
        let expr = PredicateParser::parse("row.v > 1").unwrap();
        assert_eq!(expr, Expr::compare(Expr::field("v"), CompareOp::Gt, Expr::literal(1)));
    }

    #[test]
    fn test_field_spellings() {
        let bare = PredicateParser::parse("v = 1").unwrap();
        let data = PredicateParser::parse("data.v = 1").unwrap();
        assert_eq!(bare, data);

        let nested = PredicateParser::parse("row.address.city = 'Oslo'").unwrap();
        assert_eq!(
            nested,
            Expr::compare(Expr::field("address.city"), CompareOp::Eq, Expr::literal("Oslo"))
        );
    }

    #[test]
    fn test_logical_and_grouping() {
        let expr = PredicateParser::parse("(a = 1 OR b = 2) AND NOT c").unwrap();
        match expr {
            Expr::And(left, right) => {
                assert!(matches!(*left, Expr::Or(_, _)));
                assert_eq!(*right, Expr::Not(Box::new(Expr::field("c"))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        let expr = PredicateParser::parse("x IN (1, -2, 2.5, 'a', TRUE, NULL)").unwrap();
        match expr {
            Expr::InList { list, negated, .. } => {
                assert!(!negated);
                let values: Vec<Value> = list
                    .into_iter()
                    .map(|e| match e {
                        Expr::Literal(v) => v,
                        other => panic!("not a literal: {:?}", other),
                    })
                    .collect();
                assert_eq!(values, vec![json!(1), json!(-2), json!(2.5), json!("a"), json!(true), Value::Null]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_null_between_like() {
        assert!(matches!(
            PredicateParser::parse("x IS NOT NULL").unwrap(),
            Expr::IsNull { negated: true, .. }
        ));
        assert!(matches!(
            PredicateParser::parse("x NOT BETWEEN 1 AND 5").unwrap(),
            Expr::Between { negated: true, .. }
        ));
        assert!(matches!(
            PredicateParser::parse("name LIKE 'A%'").unwrap(),
            Expr::Like { ref pattern, negated: false, .. } if pattern == "A%"
        ));
    }

    #[test]
    fn test_rejects_functions_and_arithmetic() {
        let err = PredicateParser::parse("upper(name) = 'A'").unwrap_err();
        assert!(matches!(err, PredicateError::Unsupported(_)));

        let err = PredicateParser::parse("a + 1 > 2").unwrap_err();
        assert!(matches!(err, PredicateError::Unsupported(_)));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(PredicateParser::parse("").unwrap_err().is_syntax());
        assert!(PredicateParser::parse("a = ").unwrap_err().is_syntax());
        assert!(PredicateParser::parse("a = 1 b").unwrap_err().is_syntax());
    }
}
