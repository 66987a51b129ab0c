//! Caller-level permission bypasses.
//!
//! The engine never grants access because of who the caller is, only because
//! of what a policy says. Administrators and portal tokens are handled here,
//! around the engine, by the request handlers.

use flowperm_domain::{PermissionHelpers, UserContext};
use tracing::debug;

use crate::config::BypassSettings;

/// Which administrator role granted a bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBypass {
    SystemAdmin,
    TenantAdmin,
}

impl AdminBypass {
    /// Grant reason reported to the caller.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "SystemAdmin",
            Self::TenantAdmin => "TenantAdmin",
        }
    }
}

/// Bypass rules built from the `bypass` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BypassPolicy {
    admin_privileges: bool,
    portal_access: bool,
}

impl Default for BypassPolicy {
    fn default() -> Self {
        Self::from_settings(&BypassSettings::default())
    }
}

impl BypassPolicy {
    pub fn from_settings(settings: &BypassSettings) -> Self {
        Self {
            admin_privileges: settings.admin_privileges,
            portal_access: settings.portal_access,
        }
    }

    /// A policy that never bypasses anything.
    pub fn disabled() -> Self {
        Self {
            admin_privileges: false,
            portal_access: false,
        }
    }

    /// The admin role that grants `ctx` full access, if any.
    pub fn admin_bypass(&self, ctx: &UserContext) -> Option<AdminBypass> {
        if !self.admin_privileges {
            return None;
        }
        let helpers = PermissionHelpers::new(ctx);
        let bypass = if helpers.is_system_admin() {
            Some(AdminBypass::SystemAdmin)
        } else if helpers.is_tenant_admin() {
            Some(AdminBypass::TenantAdmin)
        } else {
            None
        };
        if let Some(bypass) = bypass {
            debug!(user_id = %ctx.user_id, role = bypass.as_str(), "admin bypass");
        }
        bypass
    }

    /// Whether `ctx` skips entity checks entirely.
    pub fn grants_full_access(&self, ctx: &UserContext) -> bool {
        self.admin_bypass(ctx).is_some()
    }

    /// Whether `ctx` skips module-level checks (portal token on a
    /// portal-accessible endpoint). Entity checks still apply.
    pub fn grants_module_access(&self, ctx: &UserContext) -> bool {
        self.portal_access && PermissionHelpers::new(ctx).is_portal_token_with_portal_access()
    }
}
