//! Options for rule application.

/// Which grouping parentheses are dropped from the rewritten tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParenCleanup {
    /// Drop parentheses around atoms, negations, nested parentheses,
    /// function arguments and the root.
    #[default]
    Redundant,

    /// Keep every parenthesis of the input and the replacement.
    Off,
}

/// Post-processing applied by [`apply_rule_with`](crate::apply_rule_with).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Restore `a - b / c` and `a - b c` forms in the replacement after
    /// sign unwrapping.
    pub fix_minuses: bool,
    pub paren_cleanup: ParenCleanup,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            fix_minuses: true,
            paren_cleanup: ParenCleanup::default(),
        }
    }
}

impl ApplyOptions {
    /// Apply the replacement verbatim: no sign restoration, no paren cleanup.
    pub fn raw() -> Self {
        ApplyOptions {
            fix_minuses: false,
            paren_cleanup: ParenCleanup::Off,
        }
    }
}
