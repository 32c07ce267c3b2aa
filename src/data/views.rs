//! Filter and sort views over JSON sequences
//!
//! The views never touch the slice they are given; they always build a new
//! `Vec`. Helpers at the bottom build the predicates and comparators the
//! binary uses to slice a dataset by field.

use std::cmp::Ordering;

use serde_json::Value;

/// Human readable name of a JSON value's type, for error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Elements of `items` for which `predicate` holds, in their original order
pub fn filter_items<P>(items: &[Value], predicate: P) -> Vec<Value>
where
    P: Fn(&Value) -> bool,
{
    items.iter().filter(|item| predicate(*item)).cloned().collect()
}

/// A copy of `items` ordered by `compare`
///
/// The sort is stable: elements that compare `Equal` keep their relative order.
pub fn sort_items<C>(items: &[Value], mut compare: C) -> Vec<Value>
where
    C: FnMut(&Value, &Value) -> Ordering,
{
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
}

/// Predicate matching objects whose numeric `field` is strictly below `limit`
///
/// Items without the field, or where it is not a number, do not match.
pub fn field_below(field: impl Into<String>, limit: f64) -> impl Fn(&Value) -> bool {
    let field = field.into();
    move |item| {
        item.get(&field)
            .and_then(Value::as_f64)
            .is_some_and(|n| n < limit)
    }
}

/// Comparator ordering objects by `field`
///
/// See [`compare_values`] for how mixed or missing values are ranked.
pub fn by_field(field: impl Into<String>) -> impl Fn(&Value, &Value) -> Ordering {
    let field = field.into();
    move |a, b| compare_values(a.get(&field), b.get(&field))
}

/// Total order over optional JSON values
///
/// Missing < null < booleans < numbers < strings < arrays/objects.
/// Numbers compare numerically, strings lexicographically. Arrays and objects
/// are not ranked against each other and compare `Equal`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}
