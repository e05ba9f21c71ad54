use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AttendanceStatus, EmployeeId},
    error::StoreError,
};

/// Registration payload for `POST /api/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEmployee {
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
}

impl RegisterEmployee {
    /// Pre-submission check matching what the store enforces server-side:
    /// every field present, email of a plausible shape.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (field, value) in [
            ("emp_id", &self.emp_id),
            ("name", &self.name),
            ("email", &self.email),
            ("department", &self.department),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::validation(format!("{field} is required")));
            }
        }
        if !is_plausible_email(&self.email) {
            return Err(StoreError::validation("Invalid email format"));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, host)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || host.contains('@') {
        return false;
    }
    host.split_once('.')
        .is_some_and(|(name, tld)| !name.is_empty() && !tld.is_empty())
}

/// Write payload for `POST /api/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendance {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Body of a rejected write, `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> RegisterEmployee {
        RegisterEmployee {
            emp_id: "E1".into(),
            name: "Ada".into(),
            email: "a@x.com".into(),
            department: "Eng".into(),
        }
    }

    #[test]
    fn accepts_complete_candidate() {
        assert!(candidate().validate().is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        let mut missing = candidate();
        missing.department = "  ".into();
        let err = missing.validate().expect_err("must reject");
        assert_eq!(err, StoreError::validation("department is required"));
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["plainaddress", "a@b", "@x.com", "a@b@c.com", "a@.com"] {
            let mut bad = candidate();
            bad.email = email.into();
            assert!(bad.validate().is_err(), "accepted {email}");
        }
    }
}
