/// How a query treats a native declaration with the same name as the
/// requested foreign one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchPolicy {
    /// A native declaration is an invariant violation.
    ErrorIfNative,
    /// Behave as if no native declaration existed.
    IgnoreNative,
    /// Return the native declaration without consulting foreign sources.
    #[default]
    PreferNative,
    /// Resolve the foreign declaration; fall back to the native one.
    PreferForeign,
}

impl SearchPolicy {
    /// Whether a native hit ends the query before foreign resolution.
    pub fn stops_at_native(self) -> bool {
        matches!(self, Self::PreferNative)
    }

    pub fn falls_back_to_native(self) -> bool {
        matches!(self, Self::PreferForeign)
    }
}
