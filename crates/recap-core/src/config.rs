//! Validated run configuration shared by every pipeline stage.

use std::collections::BTreeSet;

use chrono_tz::Tz;

use crate::error::{RecapError, Result};
use crate::models::Role;
use crate::time_utils::resolve_timezone;

/// Number of entries kept in every top-N list unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;

/// Number of excerpts kept unless configured otherwise.
pub const DEFAULT_MAX_EXCERPTS: usize = 12;

// ── RoleScope ─────────────────────────────────────────────────────────────────

/// The subset of roles included in aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleScope {
    /// `None` means every role, including [`Role::Unknown`].
    roles: Option<BTreeSet<Role>>,
}

impl RoleScope {
    /// A scope admitting every message.
    pub fn all() -> Self {
        Self { roles: None }
    }

    /// Build a scope from configured role names.
    ///
    /// Names are matched case-insensitively against `user`, `assistant`,
    /// `system` and `tool`. Blank entries are ignored; an unknown name or
    /// a list with no names at all is rejected.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let role: Role = name.parse()?;
            if role == Role::Unknown {
                return Err(RecapError::InvalidConfiguration(
                    "role \"unknown\" cannot be selected explicitly".to_string(),
                ));
            }
            roles.insert(role);
        }
        if roles.is_empty() {
            return Err(RecapError::InvalidConfiguration(
                "role scope is empty".to_string(),
            ));
        }
        Ok(Self { roles: Some(roles) })
    }

    pub fn is_all(&self) -> bool {
        self.roles.is_none()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.as_ref().map_or(true, |set| set.contains(&role))
    }

    /// The explicit roles, or `None` for the unrestricted scope.
    pub fn roles(&self) -> Option<Vec<Role>> {
        self.roles.as_ref().map(|set| set.iter().copied().collect())
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Options for one recap run, validated before any parsing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Restrict temporal statistics to this local calendar year.
    pub year: Option<i32>,
    pub role_scope: RoleScope,
    /// Scrub message text and titles before aggregation.
    pub redact: bool,
    /// Zone used to project instants onto local calendar days and hours.
    pub timezone: Tz,
    pub top_n: usize,
    pub max_excerpts: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            year: None,
            role_scope: RoleScope::all(),
            redact: false,
            timezone: Tz::UTC,
            top_n: DEFAULT_TOP_N,
            max_excerpts: DEFAULT_MAX_EXCERPTS,
        }
    }
}

impl RunConfig {
    /// Validate raw options into a config.
    ///
    /// An empty `roles` slice selects every role. `timezone` accepts an IANA
    /// name or `"auto"`.
    pub fn from_options(
        year: Option<i32>,
        roles: &[String],
        redact: bool,
        timezone: &str,
    ) -> Result<Self> {
        if let Some(y) = year {
            if !(1..=9999).contains(&y) {
                return Err(RecapError::InvalidConfiguration(format!(
                    "year {} is outside 1..=9999",
                    y
                )));
            }
        }

        let role_scope = if roles.is_empty() {
            RoleScope::all()
        } else {
            RoleScope::from_names(roles)?
        };

        Ok(Self {
            year,
            role_scope,
            redact,
            timezone: resolve_timezone(timezone)?,
            ..Self::default()
        })
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_max_excerpts(mut self, max_excerpts: usize) -> Self {
        self.max_excerpts = max_excerpts;
        self
    }
}
