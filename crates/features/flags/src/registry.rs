//! Namespaced flag and switch types resolved through a [`FlagSource`].

use crate::source::FlagSource;
use std::borrow::Cow;
use tracing::trace;

/// Configuration-namespace handle for [`Switch`] lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchNamespace {
    name: Cow<'static, str>,
    log_prefix: Cow<'static, str>,
}

impl SwitchNamespace {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        log_prefix: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { name: name.into(), log_prefix: log_prefix.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }
}

/// Configuration-namespace handle for [`Flag`] lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagNamespace {
    name: Cow<'static, str>,
    log_prefix: Cow<'static, str>,
}

impl FlagNamespace {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        log_prefix: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { name: name.into(), log_prefix: log_prefix.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }
}

/// A namespaced boolean toggle that is inactive unless the source defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    namespace: SwitchNamespace,
    name: Cow<'static, str>,
}

impl Switch {
    #[must_use]
    pub fn new(namespace: SwitchNamespace, name: impl Into<Cow<'static, str>>) -> Self {
        Self { namespace, name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &SwitchNamespace {
        &self.namespace
    }

    /// Fully qualified lookup name, `<namespace>.<name>`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace.name(), self.name)
    }

    /// Resolves the switch against `source`; undefined means inactive.
    pub fn is_active(&self, source: &impl FlagSource) -> bool {
        let qualified = self.qualified_name();
        let active = source.value(&qualified).unwrap_or(false);
        trace!(switch = %qualified, active, "{}switch resolved", self.namespace.log_prefix());
        active
    }
}

/// An immutable namespaced flag with an explicit default for undefined values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    namespace: FlagNamespace,
    name: Cow<'static, str>,
    default_when_undefined: bool,
}

impl Flag {
    #[must_use]
    pub fn new(
        namespace: FlagNamespace,
        name: impl Into<Cow<'static, str>>,
        default_when_undefined: bool,
    ) -> Self {
        Self { namespace, name: name.into(), default_when_undefined }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &FlagNamespace {
        &self.namespace
    }

    #[must_use]
    pub const fn default_when_undefined(&self) -> bool {
        self.default_when_undefined
    }

    /// Fully qualified lookup name, `<namespace>.<name>`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace.name(), self.name)
    }

    /// Resolves the flag against `source`, falling back to the declared default.
    pub fn is_enabled(&self, source: &impl FlagSource) -> bool {
        let qualified = self.qualified_name();
        let enabled = source.value(&qualified).unwrap_or(self.default_when_undefined);
        trace!(flag = %qualified, enabled, "{}flag resolved", self.namespace.log_prefix());
        enabled
    }
}
