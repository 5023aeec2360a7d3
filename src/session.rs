use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Role {
        SuperAdmin => "superadmin",
        Admin => "admin",
        Employee => "pegawai",
    }
}

/// The logged-in employee, handed to every component explicitly.
///
/// Credential storage lives outside this crate; whoever owns it builds a
/// `SessionContext` once per login and clones it into the services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub employee_id: i64,
    pub name: String,
    pub company_id: Option<i64>,
    pub role: Role,
}

impl SessionContext {
    pub fn new(employee_id: i64, name: impl Into<String>, role: Role) -> Self {
        Self {
            employee_id,
            name: name.into(),
            company_id: None,
            role,
        }
    }

    pub fn with_company(mut self, company_id: i64) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// Get the employee ID
    pub fn employee_id(&self) -> i64 {
        self.employee_id
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self.role, Role::SuperAdmin)
    }

    /// Admins and super admins may approve, reject and delete shift mappings
    pub fn is_privileged(&self) -> bool {
        self.is_admin() || self.is_super_admin()
    }

    pub fn require_privileged(&self, action: &str) -> AppResult<()> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "{} requires an admin role",
                action
            )))
        }
    }

    /// Employees act on their own records only; privileged roles on anyone's
    pub fn can_act_for(&self, employee_id: i64) -> bool {
        self.employee_id == employee_id || self.is_privileged()
    }
}
