//! Runtime type tags and the argument bag handed to listeners.
//!
//! Listener handlers declare typed parameters; the values a middleware can
//! offer travel in an [`ArgumentBag`]. Matching happens on [`TypeTag`]s, so
//! the bag can carry unrelated types side by side.
//!
//! A type may declare one immediate ancestor through [`Typed::ancestor`].
//! Composition stands in for inheritance: `Admin` holding a `User` exposes
//! that `User` as its ancestor view, and a handler asking for `User` binds
//! to the `Admin` argument.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Identity of a concrete Rust type, with its name kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    /// The identity every middleware shares.
    ///
    /// Registry entries keyed by it are never dispatched: a pipeline does not
    /// deliver events to listeners registered against the abstraction it is
    /// itself an instance of.
    pub fn base() -> Self {
        Self::of::<crate::middleware::Pipeline>()
    }

    pub(crate) fn from_parts(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> TypeId { self.id }
    pub fn name(&self) -> &'static str { self.name }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ── Typed ─────────────────────────────────────────────────────────────────────

/// Upcast to `&dyn Any`. Blanket-implemented; never implement it by hand.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any { self }
}

/// A value that can travel in an [`ArgumentBag`].
///
/// Most types need nothing beyond an empty impl:
///
/// ```rust
/// use warden::event::Typed;
///
/// struct User { id: u64 }
/// impl Typed for User {}
/// ```
///
/// A type standing in for a subtype returns its parent from `ancestor`:
///
/// ```rust
/// use std::any::Any;
/// use warden::event::Typed;
///
/// struct User { id: u64 }
/// impl Typed for User {}
///
/// struct Admin { user: User }
/// impl Typed for Admin {
///     fn ancestor(&self) -> Option<&dyn Any> { Some(&self.user) }
/// }
/// ```
pub trait Typed: AsAny + Send + Sync + 'static {
    /// Immediate ancestor view. Only this one level is consulted when
    /// matching handler parameters.
    fn ancestor(&self) -> Option<&dyn Any> {
        None
    }
}

// ── Argument ──────────────────────────────────────────────────────────────────

/// One typed value offered to listeners.
#[derive(Clone)]
pub struct Argument {
    tag: TypeTag,
    value: Arc<dyn Typed>,
}

impl Argument {
    pub fn new<T: Typed>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Wrap a value that is already shared, without copying it.
    pub fn shared<T: Typed>(value: Arc<T>) -> Self {
        Self { tag: TypeTag::of::<T>(), value }
    }

    pub fn tag(&self) -> TypeTag { self.tag }

    /// Tag of the immediate ancestor, if the value declares one.
    pub fn ancestor_tag(&self) -> Option<TypeId> {
        // `Any::type_id` through the vtable yields the referent's type.
        (*self.value).ancestor().map(|a| a.type_id())
    }

    /// True if this argument can fill a parameter declared as `declared`.
    pub fn satisfies(&self, declared: &TypeTag) -> bool {
        self.tag == *declared || self.ancestor_tag() == Some(declared.id())
    }

    /// View the value as `T`, directly or through its ancestor.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let value = &*self.value;
        value.as_any()
            .downcast_ref::<T>()
            .or_else(|| value.ancestor()?.downcast_ref::<T>())
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Argument").field(&self.tag).finish()
    }
}

// ── ArgumentBag ───────────────────────────────────────────────────────────────

/// Ordered sequence of arguments. Order matters: the first matching argument
/// wins a parameter slot.
#[derive(Clone, Debug, Default)]
pub struct ArgumentBag {
    args: Vec<Argument>,
}

impl ArgumentBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Typed>(mut self, value: T) -> Self {
        self.push(Argument::new(value));
        self
    }

    pub fn push(&mut self, arg: Argument) {
        self.args.push(arg);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    pub fn len(&self) -> usize { self.args.len() }
    pub fn is_empty(&self) -> bool { self.args.is_empty() }

    /// Concrete type names, in bag order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.args.iter().map(|a| a.tag.name()).collect()
    }
}
