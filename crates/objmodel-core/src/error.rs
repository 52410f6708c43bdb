//! Error types for every phase of the object model.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ModelError (top-level wrapper)
//! ├── DeclarationErrors  - every problem found while freezing a table
//! │   └── DeclarationError
//! ├── ConstructionError  - instantiation failures (constructor choice, delegation)
//! ├── RuntimeError       - member calls, property access, failures raised by bodies
//! └── BindError          - argument binding against a parameter list
//! ```
//!
//! Declaration errors are collected, never short-circuited, so one failed
//! `freeze()` reports everything wrong with the table at once.

use thiserror::Error;

use crate::{ObjectHandle, Visibility};

// ============================================================================
// Declaration Errors
// ============================================================================

/// Errors detected while registering declarations or freezing the table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    /// A referenced type is not registered.
    #[error("unknown type '{name}' referenced by '{referenced_by}'")]
    UnknownType {
        /// The missing type name.
        name: String,
        /// The declaration holding the reference.
        referenced_by: String,
    },

    /// A type with this name is already registered.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// Registration attempted after the table was frozen.
    #[error("cannot register '{name}': declaration table is frozen")]
    TableFrozen {
        /// The rejected declaration.
        name: String,
    },

    /// A supertype reference has the wrong kind.
    #[error("'{class}' cannot use '{supertype}' as a supertype: {reason}")]
    InvalidSupertype {
        /// The declaring type.
        class: String,
        /// The offending supertype.
        supertype: String,
        /// Why it is invalid.
        reason: &'static str,
    },

    /// The inheritance graph contains a cycle.
    #[error("circular inheritance involving '{name}'")]
    CircularInheritance {
        /// A type on the cycle.
        name: String,
    },

    /// A class extends a class that is neither open nor abstract.
    #[error("'{class}' cannot extend final class '{superclass}'")]
    FinalSuperclass {
        /// The subclass.
        class: String,
        /// The final superclass.
        superclass: String,
    },

    /// Two members of one declaration share a signature.
    #[error("'{owner}' declares '{signature}' more than once")]
    DuplicateMember {
        /// The declaring type.
        owner: String,
        /// The repeated signature.
        signature: String,
    },

    /// A member carries modifiers that cannot be combined.
    #[error("'{owner}.{member}' has conflicting modifiers: {detail}")]
    ConflictingModifiers {
        /// The declaring type.
        owner: String,
        /// The member name.
        member: String,
        /// Which combination is invalid.
        detail: &'static str,
    },

    /// An override has no open, abstract or interface ancestor member.
    #[error("'{owner}.{signature}' overrides nothing open, abstract or declared by an interface")]
    IllegalOverride {
        /// The declaring type.
        owner: String,
        /// The override's signature.
        signature: String,
    },

    /// An override targets a final member.
    #[error("'{owner}.{signature}' overrides final member of '{ancestor}'")]
    OverrideOfFinal {
        /// The declaring type.
        owner: String,
        /// The override's signature.
        signature: String,
        /// Where the final member is declared.
        ancestor: String,
    },

    /// Several unrelated interfaces provide the member, at least one with a
    /// default body, and the class does not override it.
    #[error("'{class}' must override '{signature}': inherited from {}", interfaces.join(", "))]
    AmbiguousOverride {
        /// The class lacking the override.
        class: String,
        /// The conflicting signature.
        signature: String,
        /// The interfaces declaring it.
        interfaces: Vec<String>,
    },

    /// A member redeclares an overridable ancestor member without `override`.
    #[error("'{owner}.{signature}' hides member of '{ancestor}' and needs the override modifier")]
    MissingOverrideModifier {
        /// The declaring type.
        owner: String,
        /// The member signature.
        signature: String,
        /// Where the hidden member is declared.
        ancestor: String,
    },

    /// An override declares a default value; overrides inherit defaults.
    #[error("'{owner}.{signature}' is an override and may not declare a default for '{param}'")]
    OverrideRedeclaresDefault {
        /// The declaring type.
        owner: String,
        /// The override's signature.
        signature: String,
        /// The offending parameter.
        param: String,
    },

    /// A concrete class leaves an abstract member without implementation.
    #[error("class '{class}' does not implement abstract member '{signature}' of '{declared_in}'")]
    AbstractMemberNotImplemented {
        /// The concrete class.
        class: String,
        /// The unimplemented signature.
        signature: String,
        /// Where the abstract member is declared.
        declared_in: String,
    },

    /// Interfaces cannot hold backing fields.
    #[error("interface '{interface}' cannot declare stored property '{member}'")]
    StoredPropertyInInterface {
        /// The interface.
        interface: String,
        /// The property name.
        member: String,
    },

    /// More than one vararg parameter in a single parameter list.
    #[error("'{owner}.{callable}' declares more than one vararg parameter")]
    MultipleVarargs {
        /// The declaring type.
        owner: String,
        /// The member or constructor.
        callable: String,
    },

    /// Two constructors of a class share parameter types.
    #[error("'{class}' declares constructor '{signature}' more than once")]
    DuplicateConstructor {
        /// The class.
        class: String,
        /// The repeated constructor signature.
        signature: String,
    },

    /// A secondary constructor of a class with a primary constructor must
    /// delegate via `this(...)`.
    #[error("secondary constructor #{index} of '{class}' must delegate to the primary constructor")]
    MissingPrimaryDelegation {
        /// The class.
        class: String,
        /// Index of the secondary constructor.
        index: usize,
    },

    /// Only primary-constructor parameters can declare properties.
    #[error("parameter '{param}' of a secondary constructor of '{class}' cannot declare a property")]
    PromotionOutsidePrimary {
        /// The class.
        class: String,
        /// The parameter.
        param: String,
    },

    /// A constructor passes superclass arguments in a class without superclass.
    #[error("'{class}' calls a superclass constructor but has no superclass")]
    SuperCallWithoutSuperclass {
        /// The class.
        class: String,
    },

    /// A property initializer names no stored property of its class.
    #[error("initializer for '{property}' in '{class}' has no stored property to write")]
    InitializerWithoutProperty {
        /// The class.
        class: String,
        /// The initialized name.
        property: String,
    },
}

/// Every declaration error found by one `freeze()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationErrors {
    errors: Vec<DeclarationError>,
}

impl DeclarationErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error.
    pub fn push(&mut self, error: DeclarationError) {
        self.errors.push(error);
    }

    /// Append every error from an iterator.
    pub fn extend(&mut self, errors: impl IntoIterator<Item = DeclarationError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclarationError> {
        self.errors.iter()
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<DeclarationError> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), DeclarationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for DeclarationErrors {
    type Item = DeclarationError;
    type IntoIter = std::vec::IntoIter<DeclarationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a DeclarationErrors {
    type Item = &'a DeclarationError;
    type IntoIter = std::slice::Iter<'a, DeclarationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<DeclarationError> for DeclarationErrors {
    fn from(error: DeclarationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for DeclarationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeclarationErrors {}

// ============================================================================
// Bind Errors
// ============================================================================

/// Errors binding call-site arguments to a parameter list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// A parameter without default received no value.
    #[error("no value passed for parameter '{param}'")]
    MissingArgument {
        /// The unfilled parameter.
        param: String,
    },

    /// A named argument matches no parameter.
    #[error("no parameter named '{name}'")]
    UnknownNamedArgument {
        /// The unmatched name.
        name: String,
    },

    /// A parameter received more than one value.
    #[error("parameter '{param}' is bound more than once")]
    DuplicateBinding {
        /// The parameter.
        param: String,
    },

    /// More positional arguments than parameters and no vararg to absorb them.
    #[error("too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments {
        /// Number of parameters.
        expected: usize,
        /// Number of positional arguments.
        got: usize,
    },

    /// A positional argument follows a named argument that was not in its own position.
    #[error("positional argument #{index} follows an out-of-position named argument")]
    PositionalAfterNamed {
        /// Index of the argument in the call.
        index: usize,
    },

    /// A spread argument was not passed to a vararg parameter.
    #[error("spread argument #{index} must be passed to a vararg parameter")]
    SpreadOutsideVararg {
        /// Index of the argument in the call.
        index: usize,
    },

    /// A trailing block was given but the last parameter is not callable or
    /// is already bound.
    #[error("trailing block cannot bind to {}", param.as_deref().unwrap_or("an empty parameter list"))]
    TrailingBlockMismatch {
        /// The last parameter, if any.
        param: Option<String>,
    },

    /// A value does not conform to the declared parameter type.
    #[error("parameter '{param}' expects {expected}, got {found}")]
    TypeMismatch {
        /// The parameter.
        param: String,
        /// Declared type.
        expected: String,
        /// Kind of the supplied value.
        found: String,
    },

    /// Evaluating a default expression failed.
    #[error("default value of '{param}' failed: {source}")]
    DefaultFailed {
        /// The parameter.
        param: String,
        /// What the default expression raised.
        source: Box<RuntimeError>,
    },
}

// ============================================================================
// Construction Errors
// ============================================================================

/// Errors aborting an instantiation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    /// The class is not registered.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Interfaces cannot be constructed.
    #[error("'{name}' is an interface and cannot be instantiated")]
    NotInstantiable {
        /// The interface name.
        name: String,
    },

    /// Abstract classes are only constructed as part of a subclass.
    #[error("cannot create an instance of abstract class '{class}'")]
    AbstractInstantiation {
        /// The abstract class.
        class: String,
    },

    /// The declaration table has not been successfully frozen.
    #[error("declaration table is not frozen")]
    TableNotFrozen,

    /// Several constructors bind equally well.
    #[error("ambiguous constructor call for '{class}': {}", candidates.join(", "))]
    AmbiguousConstructor {
        /// The class.
        class: String,
        /// The tied candidates.
        candidates: Vec<String>,
    },

    /// No constructor accepts the arguments.
    #[error("no constructor of '{class}' matches the arguments; candidates: {}", candidates.join(", "))]
    NoMatchingConstructor {
        /// The class.
        class: String,
        /// Every candidate considered.
        candidates: Vec<String>,
    },

    /// Implicit `super()` found no zero-argument superclass constructor.
    #[error("'{class}' implicitly calls super() but '{superclass}' has no zero-argument constructor")]
    NoDefaultSuperConstructor {
        /// The subclass.
        class: String,
        /// The superclass.
        superclass: String,
    },

    /// A `this(...)` chain returns to a constructor already on the chain.
    #[error("cyclic constructor delegation in '{class}' at {constructor}")]
    CyclicDelegation {
        /// The class.
        class: String,
        /// The constructor reached twice.
        constructor: String,
    },

    /// The chosen constructor is not visible to the caller.
    #[error("constructor {constructor} of '{class}' is {visibility}")]
    InaccessibleConstructor {
        /// The class.
        class: String,
        /// The constructor signature.
        constructor: String,
        /// Its visibility.
        visibility: Visibility,
    },

    /// An inner class was constructed without a matching outer instance.
    #[error("inner class '{class}' needs an instance of '{enclosing}'")]
    MissingOuterInstance {
        /// The inner class.
        class: String,
        /// The required enclosing class.
        enclosing: String,
    },

    /// Construction nested deeper than the configured limit.
    #[error("construction depth limit of {limit} exceeded")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// The chosen constructor's arguments failed to bind.
    #[error("cannot call {constructor} of '{class}': {source}")]
    Bind {
        /// The class.
        class: String,
        /// The constructor signature.
        constructor: String,
        /// The bind failure.
        source: BindError,
    },

    /// An initializer, init block or constructor body failed.
    #[error("initialization of '{class}' failed: {source}")]
    Runtime {
        /// The class whose code failed.
        class: String,
        /// The failure.
        source: Box<RuntimeError>,
    },
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised by member calls, property access and bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The type has no member with this name.
    #[error("'{type_name}' has no member '{member}'")]
    UnknownMember {
        /// The searched type.
        type_name: String,
        /// The member name.
        member: String,
    },

    /// The member exists only abstractly.
    #[error("no implementation of '{member}' reachable from '{type_name}'")]
    NoImplementation {
        /// The searched type.
        type_name: String,
        /// The member name.
        member: String,
    },

    /// The name refers to several overloads and no arguments select one.
    #[error("'{type_name}.{member}' is ambiguous: {}", candidates.join(", "))]
    AmbiguousMember {
        /// The searched type.
        type_name: String,
        /// The member name.
        member: String,
        /// The competing signatures.
        candidates: Vec<String>,
    },

    /// No overload accepts the arguments.
    #[error("no overload of '{type_name}.{member}' matches the arguments")]
    NoMatchingOverload {
        /// The searched type.
        type_name: String,
        /// The member name.
        member: String,
    },

    /// A super qualifier does not name a direct supertype.
    #[error("'{qualifier}' is not a direct supertype of '{class}'")]
    InvalidSuperQualifier {
        /// The class making the call.
        class: String,
        /// The qualifier used.
        qualifier: String,
    },

    /// The member is not visible to the caller.
    #[error("'{type_name}.{member}' is {visibility}")]
    InaccessibleMember {
        /// The declaring type.
        type_name: String,
        /// The member name.
        member: String,
        /// Its visibility.
        visibility: Visibility,
    },

    /// Assignment to a read-only property.
    #[error("'{type_name}.{member}' is a val and cannot be reassigned")]
    ReadOnlyProperty {
        /// The declaring type.
        type_name: String,
        /// The property.
        member: String,
    },

    /// The member is of the wrong kind for the operation.
    #[error("'{type_name}.{member}' is not a {expected}")]
    WrongMemberKind {
        /// The declaring type.
        type_name: String,
        /// The member name.
        member: String,
        /// The kind the operation needed.
        expected: &'static str,
    },

    /// A stored property was read before its initializer ran.
    #[error("property '{owner}.{member}' read before initialization")]
    UninitializedProperty {
        /// The owning class of the slot.
        owner: String,
        /// The property.
        member: String,
    },

    /// The property does not hold a list.
    #[error("'{type_name}.{member}' does not hold a list")]
    NotAList {
        /// The declaring type.
        type_name: String,
        /// The property.
        member: String,
    },

    /// The handle refers to a freed or unknown instance.
    #[error("stale object handle {0}")]
    StaleHandle(ObjectHandle),

    /// The running body has no receiver.
    #[error("no receiver available in this context")]
    NoReceiver,

    /// The receiver is not an inner-class instance.
    #[error("'{class}' has no outer instance")]
    NoOuterInstance {
        /// The class of the receiver.
        class: String,
    },

    /// A body read a parameter that does not exist.
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// The parameter name.
        name: String,
    },

    /// Positional parameter access out of range.
    #[error("argument index {index} out of bounds (count: {count})")]
    ArgumentIndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of arguments.
        count: usize,
    },

    /// A value had an unexpected kind.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        /// Expected kind.
        expected: &'static str,
        /// Actual kind.
        found: &'static str,
    },

    /// A call typed against a type the receiver does not conform to.
    #[error("'{class}' instance used as '{static_class}'")]
    IncompatibleReceiver {
        /// Runtime class of the receiver.
        class: String,
        /// The static type of the call.
        static_class: String,
    },

    /// The type is not registered.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Call nesting exceeded the configured limit.
    #[error("call depth limit of {limit} exceeded")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// Arguments of a member call failed to bind.
    #[error("cannot call '{member}': {source}")]
    Bind {
        /// The member.
        member: String,
        /// The bind failure.
        source: BindError,
    },

    /// A nested construction failed.
    #[error(transparent)]
    Construction(Box<ConstructionError>),

    /// Failure raised explicitly by a body.
    #[error("{0}")]
    Failed(String),
}

impl RuntimeError {
    /// Failure raised by a body.
    pub fn failed(message: impl Into<String>) -> Self {
        RuntimeError::Failed(message.into())
    }
}

impl From<ConstructionError> for RuntimeError {
    fn from(error: ConstructionError) -> Self {
        RuntimeError::Construction(Box::new(error))
    }
}

// ============================================================================
// Top-level
// ============================================================================

/// Top-level error wrapping every phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A single registration failure.
    #[error(transparent)]
    Registration(#[from] DeclarationError),

    /// Everything rejected by `freeze()`.
    #[error("declaration table rejected:\n{0}")]
    Declaration(#[from] DeclarationErrors),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Bind(#[from] BindError),
}
