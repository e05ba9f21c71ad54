//! REST access to the external attendance record store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId},
    error::StoreError,
    protocol::{ErrorBody, MarkAttendance, RegisterEmployee},
};

/// The store contract the synchronization core runs against. `HttpStore`
/// is the production implementation; tests substitute their own.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn create_employee(&self, candidate: &RegisterEmployee) -> Result<(), StoreError>;
    async fn delete_employee(&self, id: EmployeeId) -> Result<(), StoreError>;
    async fn daily_attendance(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<EmployeeId, AttendanceStatus>, StoreError>;
    async fn attendance_history(
        &self,
        employee: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    async fn mark_attendance(&self, request: &MarkAttendance) -> Result<(), StoreError>;
}

pub struct HttpStore {
    http: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Result<Response>,
    ) -> Result<T, StoreError> {
        let response = response.map_err(|err| StoreError::fetch(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::fetch(format!("store responded with {status}")));
        }
        response
            .json()
            .await
            .map_err(|err| StoreError::fetch(err.to_string()))
    }

    /// Non-success writes carry `{"error": "..."}`; surface that message
    /// unchanged, falling back to the status line when the body is not there.
    async fn check_write(&self, response: reqwest::Result<Response>) -> Result<(), StoreError> {
        let response = response.map_err(|err| StoreError::fetch(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("store rejected the request with {status}"),
        };
        Err(StoreError::validation(message))
    }
}

#[async_trait]
impl EmployeeStore for HttpStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let response = self
            .http
            .get(format!("{}/api/employees", self.base_url))
            .send()
            .await;
        self.read_json(response).await
    }

    async fn create_employee(&self, candidate: &RegisterEmployee) -> Result<(), StoreError> {
        let response = self
            .http
            .post(format!("{}/api/employees", self.base_url))
            .json(candidate)
            .send()
            .await;
        self.check_write(response).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<(), StoreError> {
        // fire-and-forget contract: the response body is never consumed
        let response = self
            .http
            .delete(format!("{}/api/employees/{}", self.base_url, id.0))
            .send()
            .await
            .map_err(|err| StoreError::fetch(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::validation(format!(
                "delete rejected with {status}"
            )))
        }
    }

    async fn daily_attendance(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<EmployeeId, AttendanceStatus>, StoreError> {
        let response = self
            .http
            .get(format!(
                "{}/api/attendance/daily/{}",
                self.base_url,
                date.format("%Y-%m-%d")
            ))
            .send()
            .await;
        self.read_json(response).await
    }

    async fn attendance_history(
        &self,
        employee: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let response = self
            .http
            .get(format!("{}/api/attendance/{}", self.base_url, employee.0))
            .send()
            .await;
        self.read_json(response).await
    }

    async fn mark_attendance(&self, request: &MarkAttendance) -> Result<(), StoreError> {
        let response = self
            .http
            .post(format!("{}/api/attendance", self.base_url))
            .json(request)
            .send()
            .await;
        self.check_write(response).await
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
