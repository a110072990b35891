//! Type-driven parameter binding.

use std::any::Any;

use crate::error::ConfigurationError;
use crate::event::argument::{Argument, ArgumentBag};
use crate::event::registry::Param;

/// Parameters bound for one handler invocation, by name.
#[derive(Debug, Default)]
pub struct Bound<'a> {
    slots: Vec<(&'static str, &'a Argument)>,
}

impl<'a> Bound<'a> {
    pub fn get<T: Any>(&self, name: &str) -> Option<&'a T> {
        self.argument(name)?.downcast_ref::<T>()
    }

    /// Like [`get`](Bound::get), but an absent slot is a configuration error.
    pub fn require<T: Any>(&self, name: &'static str) -> Result<&'a T, ConfigurationError> {
        self.get::<T>(name).ok_or(ConfigurationError::UnboundParameter {
            name,
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.argument(name).is_some()
    }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    fn argument(&self, name: &str) -> Option<&'a Argument> {
        self.slots.iter().find(|(n, _)| *n == name).map(|(_, a)| *a)
    }
}

/// Bind each declared parameter to the first argument in bag order whose
/// type, or immediate ancestor type, equals the declared type.
///
/// Unmatched parameters are simply left out; deciding whether that is fatal
/// belongs to the caller (see [`unbound_required`]).
pub fn resolve<'a>(params: &[Param], bag: &'a ArgumentBag) -> Bound<'a> {
    let slots = params
        .iter()
        .filter_map(|p| bag.iter().find(|a| a.satisfies(&p.tag)).map(|a| (p.name, a)))
        .collect();
    Bound { slots }
}

/// First required parameter that `bound` leaves empty.
pub fn unbound_required<'p>(params: &'p [Param], bound: &Bound<'_>) -> Option<&'p Param> {
    params.iter().find(|p| p.required && !bound.contains(p.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::argument::{TypeTag, Typed};

    struct X(u8);
    impl Typed for X {}

    struct Y(u8);
    impl Typed for Y {}

    struct Person;
    impl Typed for Person {}

    struct User {
        person: Person,
    }
    impl Typed for User {
        fn ancestor(&self) -> Option<&dyn Any> { Some(&self.person) }
    }

    struct Admin {
        user: User,
    }
    impl Typed for Admin {
        fn ancestor(&self) -> Option<&dyn Any> { Some(&self.user) }
    }

    fn param<T: Typed>(name: &'static str) -> Param {
        Param { name, tag: TypeTag::of::<T>(), required: true }
    }

    #[test]
    fn binds_by_type_not_position() {
        let bag = ArgumentBag::new().with(Y(2)).with(X(1));
        let params = [param::<X>("a"), param::<Y>("b")];

        let bound = resolve(&params, &bag);

        assert_eq!(bound.get::<X>("a").map(|x| x.0), Some(1));
        assert_eq!(bound.get::<Y>("b").map(|y| y.0), Some(2));
    }

    #[test]
    fn first_match_wins() {
        let bag = ArgumentBag::new().with(X(1)).with(X(2));
        let bound = resolve(&[param::<X>("a")], &bag);
        assert_eq!(bound.get::<X>("a").map(|x| x.0), Some(1));
    }

    #[test]
    fn only_one_ancestor_level_is_checked() {
        let bag = ArgumentBag::new().with(Admin { user: User { person: Person } });
        let params = [param::<User>("user"), param::<Person>("person")];

        let bound = resolve(&params, &bag);

        assert!(bound.contains("user"));
        assert!(!bound.contains("person"));
        assert_eq!(unbound_required(&params, &bound).map(|p| p.name), Some("person"));
    }

    #[test]
    fn require_reports_unbound_slot() {
        let bag = ArgumentBag::new();
        let bound = resolve(&[param::<X>("a")], &bag);
        assert!(bound.is_empty());
        assert!(matches!(
            bound.require::<X>("a"),
            Err(ConfigurationError::UnboundParameter { name: "a", .. })
        ));
    }
}
