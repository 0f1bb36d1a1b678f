//! Classification of failed calls to other services.
//!
//! A [`DownstreamCall`] describes one outbound request (service, method,
//! arguments) and turns whatever went wrong with it into the matching
//! [`AppError`] variant. Retrying is left to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamCall {
    pub service_name: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl DownstreamCall {
    pub fn new(service_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Records an argument for error reporting. Unserializable values are
    /// recorded as `null`.
    pub fn arg<V: Serialize>(mut self, value: V) -> Self {
        self.args
            .push(serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    /// The service answered with a non-success status.
    pub fn failed(&self, status: u16, details: impl Into<String>) -> AppError {
        AppError::ServiceFailed {
            service_name: self.service_name.clone(),
            service_method: self.method.clone(),
            service_args: self.args.clone(),
            service_status: status,
            details: details.into(),
        }
    }

    pub fn unavailable(&self) -> AppError {
        AppError::service_unavailable(self.service_name.clone())
    }

    /// The service answered, but not with anything we can use.
    pub fn unexpected(&self) -> AppError {
        AppError::UnexpectedServiceResponse {
            service_name: self.service_name.clone(),
            service_method: self.method.clone(),
            service_args: self.args.clone(),
        }
    }

    /// Map a transport-level `reqwest` failure.
    pub fn failure(&self, error: &reqwest::Error) -> AppError {
        if let Some(status) = error.status() {
            return self.failed(status.as_u16(), error.to_string());
        }
        if error.is_connect() || error.is_timeout() {
            warn!(service = %self.service_name, method = %self.method, error = %error, "downstream unavailable");
            return self.unavailable();
        }
        if error.is_decode() || error.is_body() {
            return self.unexpected();
        }
        warn!(service = %self.service_name, method = %self.method, error = %error, "downstream transport failure");
        AppError::DownstreamRetryable {
            detail: format!(
                "Request {}.{} could not be completed",
                self.service_name, self.method
            ),
        }
    }

    /// Read a successful JSON response, classifying every way it can fail.
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!(
                service = %self.service_name,
                method = %self.method,
                status = status.as_u16(),
                "downstream returned error status"
            );
            return Err(self.failed(status.as_u16(), details));
        }

        let body = response.bytes().await.map_err(|e| self.failure(&e))?;
        serde_json::from_slice(&body).map_err(|e| {
            debug!(service = %self.service_name, method = %self.method, error = %e, "downstream body not understood");
            self.unexpected()
        })
    }
}
