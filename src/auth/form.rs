//! Hidden form tokens harvested from login pages.

use std::fmt;

/// Keys of the tokens carried between login stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Anti-forgery token from the login entry page.
    Gxf,
    /// Profile token from the identifier lookup page.
    ProfileInformation,
    /// Session-state token from the identifier lookup page.
    SessionState,
}

impl FormField {
    /// Form field name as posted to the provider.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gxf => "gxf",
            Self::ProfileInformation => "ProfileInformation",
            Self::SessionState => "SessionState",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Gxf => 0,
            Self::ProfileInformation => 1,
            Self::SessionState => 2,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token values threaded across stages; every key starts out empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionForm {
    values: [String; 3],
}

impl SessionForm {
    /// Creates a form with all keys empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value for `field` (empty when not yet set).
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    /// Stores `value` under `field`.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }
}

impl fmt::Debug for SessionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("SessionForm");
        for field in [
            FormField::Gxf,
            FormField::ProfileInformation,
            FormField::SessionState,
        ] {
            let state = if self.get(field).is_empty() { "<empty>" } else { "[REDACTED]" };
            debug.field(field.name(), &state);
        }
        debug.finish()
    }
}
