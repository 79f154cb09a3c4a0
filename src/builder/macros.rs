//! Macros for declaring state and event enums.

/// Declare a fieldless enum usable as a machine state.
///
/// Each variant is named by its optional string label, or by the variant
/// identifier when no label is given. Only lowercase-initial names such as
/// `"idle"` produce derived accessors (`isIdle`).
///
/// # Example
///
/// ```
/// use smoothstate::core::Identifier;
/// use smoothstate::state_enum;
///
/// state_enum! {
///     pub enum Light {
///         Green = "green",
///         Amber = "amber",
///         Red,
///     }
/// }
///
/// assert_eq!(Light::Green.name(), "green");
/// assert_eq!(Light::Red.name(), "Red");
/// assert_eq!(Light::Red.accessor_stem(), None);
/// ```
#[macro_export]
macro_rules! state_enum {
    ($($body:tt)*) => {
        $crate::__identifier_enum! { $($body)* }
    };
}

/// Declare a fieldless enum usable as a machine event.
///
/// Follows the same labelling rules as [`state_enum!`]; labelled events such
/// as `Fetch = "fetch"` get a trigger (`fetch`) and a probe (`canFetch`).
///
/// # Example
///
/// ```
/// use smoothstate::core::Identifier;
/// use smoothstate::event_enum;
///
/// event_enum! {
///     enum Signal {
///         Tick = "tick",
///         Reset = "reset",
///     }
/// }
///
/// assert_eq!(Signal::Tick.accessor_stem().as_deref(), Some("tick"));
/// ```
#[macro_export]
macro_rules! event_enum {
    ($($body:tt)*) => {
        $crate::__identifier_enum! { $($body)* }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __identifier_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $(#[serde(rename = $label)])?
                $variant
            ),*
        }

        impl $crate::core::Identifier for $name {
            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                match self {
                    $(Self::$variant => ::std::borrow::Cow::Borrowed(
                        $crate::__identifier_label!($variant $($label)?)
                    )),*
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __identifier_label {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident $label:literal) => {
        $label
    };
}
