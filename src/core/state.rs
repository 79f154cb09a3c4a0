//! Identifier traits for states and events.
//!
//! States and events are opaque, comparable identifiers. The engine only needs
//! equality, hashing and a printable name; everything else is up to the caller.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

/// An opaque, comparable identifier naming a state or an event.
///
/// # Example
///
/// ```rust
/// use smoothstate::core::Identifier;
///
/// assert_eq!("idle".name(), "idle");
/// assert_eq!("idle".accessor_stem().as_deref(), Some("idle"));
/// assert_eq!(7u32.name(), "7");
/// assert_eq!(7u32.accessor_stem(), None);
/// ```
pub trait Identifier: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Printable name used in error messages and logs.
    fn name(&self) -> Cow<'_, str>;

    /// Stem used to derive accessor method names (`is<Stem>`, `can<Stem>`).
    ///
    /// Only string-shaped names qualify: the first character must be an ASCII
    /// lowercase letter and the rest ASCII alphanumerics or underscores.
    /// Capitalized, numeric or otherwise irregular names return `None` and get
    /// no derived accessors.
    fn accessor_stem(&self) -> Option<String> {
        let name = self.name();
        let mut chars = name.chars();
        let first = chars.next()?;
        if !first.is_ascii_lowercase() {
            return None;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(name.into_owned())
    }
}

/// A node the machine can occupy.
pub trait State: Identifier {}

impl<T: Identifier> State for T {}

/// A trigger requested by a caller.
pub trait Event: Identifier {}

impl<T: Identifier> Event for T {}

/// Upper-case the first character of an accessor stem.
pub(crate) fn capitalize(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl Identifier for &'static str {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Identifier for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

macro_rules! integer_identifier {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identifier for $ty {
                fn name(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_identifier!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
    }

    impl Identifier for TestState {
        fn name(&self) -> Cow<'_, str> {
            match self {
                Self::Initial => Cow::Borrowed("initial"),
                Self::Processing => Cow::Borrowed("Processing"),
            }
        }
    }

    #[test]
    fn lowercase_names_produce_stems() {
        assert_eq!(TestState::Initial.accessor_stem().as_deref(), Some("initial"));
        assert_eq!("clickH".accessor_stem().as_deref(), Some("clickH"));
        assert_eq!(
            String::from("activate_alarm").accessor_stem().as_deref(),
            Some("activate_alarm")
        );
    }

    #[test]
    fn irregular_names_have_no_stem() {
        assert_eq!(TestState::Processing.accessor_stem(), None);
        assert_eq!("".accessor_stem(), None);
        assert_eq!("in progress".accessor_stem(), None);
        assert_eq!("9lives".accessor_stem(), None);
        assert_eq!(0u8.accessor_stem(), None);
        assert_eq!((-3i32).accessor_stem(), None);
    }

    #[test]
    fn integers_are_named_by_value() {
        assert_eq!(42u64.name(), "42");
        assert_eq!((-1isize).name(), "-1");
    }

    #[test]
    fn capitalize_touches_first_character_only() {
        assert_eq!(capitalize("idle"), "Idle");
        assert_eq!(capitalize("activateAlarm"), "ActivateAlarm");
        assert_eq!(capitalize(""), "");
    }
}
