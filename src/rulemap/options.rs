//! Build-time policy knobs (§4.1, §7.1).

/// How to treat a second rule definition with the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the build (default).
    Error,
    /// Emit a warning via `log` and keep the first definition.
    Warn,
    /// Silently keep the first definition.
    Ignore,
    /// Replace the previous definition.
    Overrides,
    /// Treat every duplicate as an additional `Alt` arm, as if it had
    /// `is_additional_alt` set.
    Overloads,
}

impl DuplicatePolicy {
    /// The base error/warn/ignore behavior a duplicate-rule policy falls
    /// back to once `overrides`/`overloads` have already been handled
    /// structurally (they never reach [`handle_problem`](super::handle_problem)).
    pub(crate) fn as_base(self) -> UnusedVisitorPolicy {
        match self {
            DuplicatePolicy::Warn => UnusedVisitorPolicy::Warn,
            DuplicatePolicy::Ignore => UnusedVisitorPolicy::Ignore,
            _ => UnusedVisitorPolicy::Error,
        }
    }
}

/// How to treat a visitor method with no matching rule name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnusedVisitorPolicy {
    /// Fail the build (default).
    Error,
    /// Emit a warning via `log` and continue.
    Warn,
    /// Silently ignore it.
    Ignore,
}

/// Policy knobs passed to [`super::Runtime::build`] (§4.1).
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// What to do when a rule name is defined more than once.
    pub on_duplicate_rule: DuplicatePolicy,
    /// What to do when a visitor method binds to no rule.
    pub on_unused_visitor_methods: UnusedVisitorPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            on_duplicate_rule: DuplicatePolicy::Error,
            on_unused_visitor_methods: UnusedVisitorPolicy::Error,
        }
    }
}
