//! Argument binding.
//!
//! Matches the arguments of one call site against a parameter list:
//!
//! 1. Positional arguments fill parameters left to right. The vararg
//!    parameter swallows every positional value that reaches it, and a
//!    spread argument may only land there.
//! 2. Named arguments bind by exact name. A named argument in its own
//!    position keeps positional binding going; after one out of position,
//!    positional arguments are rejected.
//! 3. A trailing block binds to the last parameter if it is callable.
//! 4. Unfilled parameters take their default, evaluated left to right over
//!    the parameters bound before them. An unfilled vararg is an empty list.
//!
//! Every bound value is checked against its declared type through
//! [`TypeCheck`], which also yields the conversion cost used for ranking.

use objmodel_core::{Arg, ArgScope, BindError, CallArgs, ObjectHandle, ParamDecl, TypeRef, Value};
use tracing::trace;

/// Cost of binding a value to `Any`.
const ANY_COST: u32 = 2;

/// Type conformance of values against declared parameter types.
pub trait TypeCheck {
    /// Cost of passing the instance `handle` where `type_name` is expected,
    /// or `None` if it does not conform.
    fn object_cost(&self, handle: ObjectHandle, type_name: &str) -> Option<u32>;

    /// Cost of passing `value` where `ty` is expected; 0 is an exact match.
    fn conversion_cost(&self, value: &Value, ty: &TypeRef) -> Option<u32> {
        match (ty, value) {
            (TypeRef::Nullable(_), Value::Null) => Some(0),
            (TypeRef::Nullable(inner), _) => self.conversion_cost(value, inner),
            (TypeRef::Any, _) => Some(ANY_COST),
            (TypeRef::Unit, Value::Unit)
            | (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::Int, Value::Int(_))
            | (TypeRef::Float, Value::Float(_))
            | (TypeRef::String, Value::String(_)) => Some(0),
            (TypeRef::Named(name), Value::Object(handle)) => self.object_cost(*handle, name),
            (TypeRef::Function(arity), Value::Function(f)) => (f.arity == *arity).then_some(0),
            (TypeRef::List(elem), Value::List(items)) => items
                .iter()
                .try_fold(0, |cost, item| Some(cost.max(self.conversion_cost(item, elem)?))),
            _ => None,
        }
    }
}

/// Parameters bound for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    /// Parameter name and value, in declaration order.
    pub values: Vec<(String, Value)>,
    /// Parameters filled from their default.
    pub defaults_used: usize,
    /// The parameter list has a vararg.
    pub vararg_used: bool,
    /// Summed conversion cost.
    pub cost: u32,
}

/// Ordering key of a successful binding; lower is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank {
    pub defaults_used: usize,
    pub vararg_used: bool,
    pub cost: u32,
}

impl BoundArgs {
    pub fn rank(&self) -> Rank {
        Rank {
            defaults_used: self.defaults_used,
            vararg_used: self.vararg_used,
            cost: self.cost,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Bind `args` to `params`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind(
    params: &[ParamDecl],
    args: &CallArgs,
    types: &dyn TypeCheck,
) -> Result<BoundArgs, BindError> {
    let vararg = params.iter().position(|p| p.vararg);
    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    let mut spilled: Vec<Value> = Vec::new();
    let mut vararg_bound = false;
    let mut next = 0;
    let mut out_of_position = false;

    for (index, arg) in args.args.iter().enumerate() {
        match arg {
            Arg::Positional(value) => {
                if out_of_position {
                    return Err(BindError::PositionalAfterNamed { index });
                }
                if vararg == Some(next) {
                    spilled.push(value.clone());
                    vararg_bound = true;
                    continue;
                }
                let Some(slot) = slots.get_mut(next) else {
                    return Err(too_many(params, args));
                };
                *slot = Some(value.clone());
                next += 1;
            }
            Arg::Spread(values) => {
                if out_of_position {
                    return Err(BindError::PositionalAfterNamed { index });
                }
                if vararg != Some(next) {
                    return Err(BindError::SpreadOutsideVararg { index });
                }
                spilled.extend(values.iter().cloned());
                vararg_bound = true;
            }
            Arg::Named(name, value) => {
                let Some(target) = params.iter().position(|p| &p.name == name) else {
                    return Err(BindError::UnknownNamedArgument { name: name.clone() });
                };
                if vararg == Some(target) {
                    if vararg_bound {
                        return Err(BindError::DuplicateBinding { param: name.clone() });
                    }
                    // A list passed by name is taken as the whole vararg.
                    match value {
                        Value::List(items) => spilled.extend(items.iter().cloned()),
                        other => spilled.push(other.clone()),
                    }
                    vararg_bound = true;
                } else {
                    if slots[target].is_some() {
                        return Err(BindError::DuplicateBinding { param: name.clone() });
                    }
                    slots[target] = Some(value.clone());
                }
                if target == next {
                    next += 1;
                } else {
                    out_of_position = true;
                }
            }
        }
    }

    if let Some(block) = &args.trailing {
        let Some((last, param)) = params.iter().enumerate().next_back() else {
            return Err(BindError::TrailingBlockMismatch { param: None });
        };
        if param.vararg || !param.ty.is_callable() {
            return Err(BindError::TrailingBlockMismatch {
                param: Some(param.name.clone()),
            });
        }
        if slots[last].is_some() {
            return Err(BindError::DuplicateBinding {
                param: param.name.clone(),
            });
        }
        slots[last] = Some(Value::Function(block.clone()));
    }

    let mut bound = BoundArgs {
        values: Vec::with_capacity(params.len()),
        defaults_used: 0,
        vararg_used: vararg.is_some(),
        cost: 0,
    };

    for (param, slot) in params.iter().zip(slots) {
        if param.vararg {
            for item in &spilled {
                bound.cost += check(types, param, item)?;
            }
            bound
                .values
                .push((param.name.clone(), Value::List(std::mem::take(&mut spilled))));
            continue;
        }

        let value = match (slot, &param.default) {
            (Some(value), _) => value,
            (None, Some(default)) => {
                bound.defaults_used += 1;
                default
                    .eval(ArgScope::new(&bound.values))
                    .map_err(|source| BindError::DefaultFailed {
                        param: param.name.clone(),
                        source: Box::new(source),
                    })?
            }
            (None, None) => {
                return Err(BindError::MissingArgument {
                    param: param.name.clone(),
                });
            }
        };
        bound.cost += check(types, param, &value)?;
        bound.values.push((param.name.clone(), value));
    }

    trace!(
        params = params.len(),
        defaults = bound.defaults_used,
        cost = bound.cost,
        "bound arguments"
    );
    Ok(bound)
}

fn check(types: &dyn TypeCheck, param: &ParamDecl, value: &Value) -> Result<u32, BindError> {
    types
        .conversion_cost(value, &param.ty)
        .ok_or_else(|| BindError::TypeMismatch {
            param: param.name.clone(),
            expected: param.ty.to_string(),
            found: value.type_name().to_string(),
        })
}

fn too_many(params: &[ParamDecl], args: &CallArgs) -> BindError {
    BindError::TooManyArguments {
        expected: params.len(),
        got: args
            .args
            .iter()
            .filter(|a| matches!(a, Arg::Positional(_)))
            .count(),
    }
}
