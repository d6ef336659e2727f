use serde::Serialize;

/// Success status.
pub const STATUS_OK: u16 = 200;
/// Status for failures raised by a collaborator.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Status for probes that ran out of time.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Response body: either `{"data": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody<T> {
  /// Successful outcome; `None` serializes as `null`.
  Data {
    /// Payload, absent when there was nothing to report.
    data: Option<T>,
  },
  /// Failed outcome with a diagnostic message.
  Error {
    /// Rendered error chain.
    error: String,
  },
}

/// Status-coded response handed back to the trigger that invoked the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceResponse<T> {
  /// HTTP-style status code.
  pub status: u16,
  /// Response payload.
  pub body: ResponseBody<T>,
}

impl<T> ServiceResponse<T> {
  /// 200 carrying `data`.
  pub fn ok(data: T) -> Self {
    Self {
      status: STATUS_OK,
      body: ResponseBody::Data { data: Some(data) },
    }
  }

  /// 200 with `data: null`.
  pub fn empty() -> Self {
    Self {
      status: STATUS_OK,
      body: ResponseBody::Data { data: None },
    }
  }

  /// Error response with the given status.
  pub fn error(status: u16, error: &anyhow::Error) -> Self {
    Self {
      status,
      body: ResponseBody::Error {
        error: format!("{error:#}"),
      },
    }
  }

  /// Returns `true` for 2xx responses.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}
