//! Macros to reduce boilerplate in the codebase

/// Normalize an enum token for lenient matching: trims, lowercases, and
/// treats `_` and `-` as spaces so `"In Progress"`, `"in_progress"` and
/// `"in-progress"` compare equal.
pub fn normalize_token(s: &str) -> String {
    s.trim().to_lowercase().replace(['_', '-'], " ")
}

/// Generate the wire-format plumbing for a string enum: a canonical label,
/// `Display`, lenient `FromStr`, and the `TryFrom<String>` / `Into<String>`
/// pair used by `#[serde(try_from = "String", into = "String")]`.
///
/// # Usage
///
/// ```rust,ignore
/// wire_enum!(
///     TicketStatus,
///     DeskError::InvalidStatus,
///     {
///         Open => "Open",
///         InProgress => "In Progress" | "started",
///     }
/// );
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $enum_name:ident,
        $error_variant:path,
        { $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum_name] = &[$($enum_name::$variant),+];

            /// Canonical wire label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($enum_name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::DeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = $crate::macros::normalize_token(s);
                $(
                    if normalized == $crate::macros::normalize_token($label)
                        $(|| normalized == $crate::macros::normalize_token($alias))*
                    {
                        return Ok($enum_name::$variant);
                    }
                )+
                Err($error_variant(s.to_string()))
            }
        }

        impl TryFrom<String> for $enum_name {
            type Error = $crate::error::DeskError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$enum_name> for String {
            fn from(value: $enum_name) -> String {
                value.label().to_string()
            }
        }
    };
}

#[cfg(test)]
mod test {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEnum {
        Alpha,
        BetaGamma,
    }

    wire_enum!(
        TestEnum,
        crate::error::DeskError::InvalidStatus,
        {
            Alpha => "Alpha" | "first",
            BetaGamma => "Beta Gamma",
        }
    );

    #[test]
    fn test_label_and_display() {
        assert_eq!(TestEnum::BetaGamma.label(), "Beta Gamma");
        assert_eq!(TestEnum::Alpha.to_string(), "Alpha");
        assert_eq!(TestEnum::ALL.len(), 2);
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!("alpha".parse::<TestEnum>().unwrap(), TestEnum::Alpha);
        assert_eq!("FIRST".parse::<TestEnum>().unwrap(), TestEnum::Alpha);
        assert_eq!("beta_gamma".parse::<TestEnum>().unwrap(), TestEnum::BetaGamma);
        assert_eq!(" beta-gamma ".parse::<TestEnum>().unwrap(), TestEnum::BetaGamma);
        assert!("delta".parse::<TestEnum>().is_err());
    }

    #[test]
    fn test_string_conversions() {
        let s: String = TestEnum::BetaGamma.into();
        assert_eq!(s, "Beta Gamma");
        assert_eq!(
            TestEnum::try_from("alpha".to_string()).unwrap(),
            TestEnum::Alpha
        );
    }
}
