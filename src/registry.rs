/// Declares a read-only registry of named parameter sets as a fieldless enum.
///
/// Every entry gets a canonical string key (plus any number of aliases accepted when parsing).
/// The generated enum implements [`FromStr`](std::str::FromStr) (unknown keys fail with
/// [`Error::UnknownParameterSet`](crate::Error::UnknownParameterSet)), [`Display`](std::fmt::Display)
/// as the canonical key, and, with the `serde` feature, serialises as the canonical key and
/// deserialises from the key or any alias.
///
/// ```rust,ignore
/// registry! {
///     /// Reference ellipsoids.
///     pub enum EllipsoidId in Ellipsoid {
///         Airy1830 = "airy1830",
///         Grs80 = "grs80" | "GRS80",
///     }
/// }
/// ```
macro_rules! registry {
    (
        $(#[$attr:meta])*
        pub enum $name:ident in $registry:ident {
            $(
                $(#[$vattr:meta])*
                $variant:ident = $key:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                $(#[$vattr])*
                #[cfg_attr(feature = "serde", serde(rename = $key $(, alias = $alias)*))]
                $variant,
            )+
        }

        impl $name {
            /// Every entry of the registry, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical key this entry is registered under.
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(key: &str) -> ::std::result::Result<Self, Self::Err> {
                match key {
                    $($key $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err($crate::Error::UnknownParameterSet {
                        registry: $crate::error::Registry::$registry,
                        key: key.to_owned(),
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}
