//! Call-site arguments.

use crate::{FunctionValue, Value};

/// One argument as written at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `f(value)`
    Positional(Value),
    /// `f(name = value)`
    Named(String, Value),
    /// `f(*values)`: only valid for a vararg parameter.
    Spread(Vec<Value>),
}

/// Ordered arguments of one call, plus an optional trailing block.
///
/// ```rust
/// use objmodel_core::{CallArgs, Value};
///
/// // makeFun(name = "Tom", greeting = "Hi")
/// let args = CallArgs::new().named("name", "Tom").named("greeting", "Hi");
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub args: Vec<Arg>,
    /// `f(...) { ... }`
    pub trailing: Option<FunctionValue>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            args: values.into_iter().map(Arg::Positional).collect(),
            trailing: None,
        }
    }

    pub fn positional(mut self, value: impl Into<Value>) -> Self {
        self.args.push(Arg::Positional(value.into()));
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push(Arg::Named(name.into(), value.into()));
        self
    }

    pub fn spread(mut self, values: Vec<Value>) -> Self {
        self.args.push(Arg::Spread(values));
        self
    }

    pub fn trailing_block(mut self, block: FunctionValue) -> Self {
        self.trailing = Some(block);
        self
    }

    /// Number of arguments, not counting the trailing block.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.trailing.is_none()
    }

    /// The positional values in order; named and spread arguments are skipped.
    pub fn positional_values(&self) -> Vec<Value> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Positional(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Short description used in diagnostics, e.g. `(String, name = Int, *[2])`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                Arg::Positional(v) => v.type_name().to_string(),
                Arg::Named(name, v) => format!("{name} = {}", v.type_name()),
                Arg::Spread(values) => format!("*[{}]", values.len()),
            })
            .collect();
        if self.trailing.is_some() {
            parts.push("{ block }".to_string());
        }
        format!("({})", parts.join(", "))
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Body;

    #[test]
    fn describe_mixed_arguments() {
        let args = CallArgs::new()
            .positional("Rex")
            .named("age", 3)
            .spread(vec![Value::from(1), Value::from(2)])
            .trailing_block(FunctionValue::new(0, Body::new(|_| Ok(Value::Unit))));
        assert_eq!(args.describe(), "(String, age = Int, *[2], { block })");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn empty_requires_no_trailing_block() {
        assert!(CallArgs::new().is_empty());
        let with_block =
            CallArgs::new().trailing_block(FunctionValue::new(0, Body::new(|_| Ok(Value::Unit))));
        assert!(!with_block.is_empty());
    }
}
