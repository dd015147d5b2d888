//! Filter evaluation.
//!
//! A missing field reads as `null`. Any comparison with `null` is false,
//! whether negated or not; only `IS [NOT] NULL` tests for it.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{CompareOp, Expr};

/// Evaluate an expression against a row.
pub fn evaluate(expr: &Expr, row: &Value) -> Value {
    match expr {
        Expr::Field(path) => lookup(row, path).cloned().unwrap_or(Value::Null),

        Expr::Literal(value) => value.clone(),

        Expr::Compare { left, op, right } => {
            let l = evaluate(left, row);
            let r = evaluate(right, row);
            Value::Bool(compare(&l, *op, &r))
        }

        Expr::And(left, right) => Value::Bool(matches(left, row) && matches(right, row)),

        Expr::Or(left, right) => Value::Bool(matches(left, row) || matches(right, row)),

        Expr::Not(inner) => Value::Bool(!matches(inner, row)),

        Expr::IsNull { expr, negated } => {
            let is_null = evaluate(expr, row).is_null();
            Value::Bool(is_null != *negated)
        }

        Expr::InList { expr, list, negated } => {
            let v = evaluate(expr, row);
            if v.is_null() {
                return Value::Bool(false);
            }
            let found = list.iter().any(|item| values_equal(&v, &evaluate(item, row)));
            Value::Bool(found != *negated)
        }

        Expr::Between { expr, low, high, negated } => {
            let v = evaluate(expr, row);
            let l = evaluate(low, row);
            let h = evaluate(high, row);
            match (compare_values(&v, &l), compare_values(&v, &h)) {
                (Some(lo), Some(hi)) => {
                    let in_range = lo != Ordering::Less && hi != Ordering::Greater;
                    Value::Bool(in_range != *negated)
                }
                _ => Value::Bool(false),
            }
        }

        Expr::Like { expr, pattern, negated } => match evaluate(expr, row) {
            Value::String(s) => Value::Bool(like_match(&s, pattern) != *negated),
            _ => Value::Bool(false),
        },
    }
}

/// Whether a row passes the filter.
pub fn matches(expr: &Expr, row: &Value) -> bool {
    value_to_bool(&evaluate(expr, row))
}

fn lookup<'a>(row: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(row, |node, key| node.as_object()?.get(key))
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Lt => compare_values(left, right) == Some(Ordering::Less),
        CompareOp::LtEq => matches!(compare_values(left, right), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => compare_values(left, right) == Some(Ordering::Greater),
        CompareOp::GtEq => {
            matches!(compare_values(left, right), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// Check if two JSON values are equal. Numbers compare by value, so `1`
/// equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().zip(b.as_f64()).map(|(x, y)| x == y).unwrap_or(false)
        }
        (a, b) => a == b,
    }
}

/// Order two JSON values of the same primitive kind.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Truthiness of a filter result.
fn value_to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Case-insensitive LIKE matching: `%` is any run, `_` one character.
fn like_match(s: &str, pattern: &str) -> bool {
    let s: Vec<char> = s.chars().flat_map(char::to_lowercase).collect();
    let p: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    match_from(&s, &p)
}

fn match_from(s: &[char], p: &[char]) -> bool {
    match p.split_first() {
        None => s.is_empty(),
        Some(('%', rest)) => (0..=s.len()).any(|i| match_from(&s[i..], rest)),
        Some(('_', rest)) => !s.is_empty() && match_from(&s[1..], rest),
        Some((c, rest)) => s.first() == Some(c) && match_from(&s[1..], rest),
    }
}
