use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::response::{STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, ServiceResponse};

/// Collaborator answering questions about a loaded page's service worker.
///
/// Every answer has an explicit absent case: a page without a registration, scope or push
/// subscription yields `Ok(None)`.
#[async_trait]
pub trait ServiceWorkerProbe: Send + Sync {
  /// Script URL of the active worker once the registration is ready.
  async fn active_script_url(&self) -> Result<Option<String>>;
  /// Scope of the page's registration.
  async fn registration_scope(&self) -> Result<Option<String>>;
  /// Current push subscription, serialized as JSON.
  async fn push_subscription(&self) -> Result<Option<Value>>;
}

/// What was learned about the page's service worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceWorkerReport {
  /// Active worker script URL.
  #[serde(rename = "hasSW")]
  pub has_sw: Option<String>,
  /// Registration scope.
  pub scope: Option<String>,
  /// Push subscription.
  #[serde(rename = "pushReg")]
  pub push_registration: Option<Value>,
}

/// Probe step, used to report which question failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
  /// Waiting for the active worker.
  ActiveWorker,
  /// Reading the registration scope.
  Scope,
  /// Reading the push subscription.
  PushSubscription,
}

impl fmt::Display for ProbeStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ProbeStage::ActiveWorker => "active worker",
      ProbeStage::Scope => "registration scope",
      ProbeStage::PushSubscription => "push subscription",
    })
  }
}

/// Failure while inspecting a service worker.
#[derive(Debug, Error)]
pub enum InspectionError {
  /// A stage did not answer within the allotted time.
  #[error("timed out after {timeout:?} waiting for {stage}")]
  Timeout {
    /// Stage that timed out.
    stage: ProbeStage,
    /// Time allowed.
    timeout: Duration,
  },
  /// The probe reported an error.
  #[error("{stage} probe failed")]
  Probe {
    /// Stage that failed.
    stage: ProbeStage,
    /// Underlying probe error.
    source: anyhow::Error,
  },
}

async fn run_stage<T>(
  stage: ProbeStage,
  timeout: Duration,
  probe: impl Future<Output = Result<Option<T>>>,
) -> Result<Option<T>, InspectionError> {
  match tokio::time::timeout(timeout, probe).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(source)) => Err(InspectionError::Probe { stage, source }),
    Err(_) => Err(InspectionError::Timeout { stage, timeout }),
  }
}

/// Ask the probe about the active worker, its scope and push subscription.
///
/// Each stage is bounded by `timeout` independently.
pub async fn inspect_service_worker<P>(
  probe: &P,
  timeout: Duration,
) -> Result<ServiceWorkerReport, InspectionError>
where
  P: ServiceWorkerProbe + ?Sized,
{
  let has_sw = run_stage(ProbeStage::ActiveWorker, timeout, probe.active_script_url()).await?;
  let scope = run_stage(ProbeStage::Scope, timeout, probe.registration_scope()).await?;
  let push_registration =
    run_stage(ProbeStage::PushSubscription, timeout, probe.push_subscription()).await?;

  Ok(ServiceWorkerReport {
    has_sw,
    scope,
    push_registration,
  })
}

/// Inspect the service worker of `site` and wrap the outcome in a response.
///
/// Timeouts map to 500, other probe failures to 400.
pub async fn service_worker_response<P>(
  probe: &P,
  site: &str,
  timeout: Duration,
) -> ServiceResponse<ServiceWorkerReport>
where
  P: ServiceWorkerProbe + ?Sized,
{
  info!(site, "inspecting service worker");

  match inspect_service_worker(probe, timeout).await {
    Ok(report) => ServiceResponse::ok(report),
    Err(err) => {
      let status = match err {
        InspectionError::Timeout { .. } => STATUS_INTERNAL_ERROR,
        InspectionError::Probe { .. } => STATUS_BAD_REQUEST,
      };
      let err = anyhow::Error::new(err);
      warn!(site, status, error = %format!("{err:#}"), "service worker inspection failed");
      ServiceResponse::error(status, &err)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use anyhow::anyhow;
  use serde_json::json;

  struct FixedProbe {
    script: Option<String>,
    scope: Option<String>,
    push: Result<Option<Value>, String>,
    stall_scope: bool,
  }

  impl Default for FixedProbe {
    fn default() -> Self {
      Self {
        script: Some("https://example.com/sw.js".to_string()),
        scope: Some("https://example.com/".to_string()),
        push: Ok(None),
        stall_scope: false,
      }
    }
  }

  #[async_trait]
  impl ServiceWorkerProbe for FixedProbe {
    async fn active_script_url(&self) -> Result<Option<String>> {
      Ok(self.script.clone())
    }

    async fn registration_scope(&self) -> Result<Option<String>> {
      if self.stall_scope {
        std::future::pending::<()>().await;
      }
      Ok(self.scope.clone())
    }

    async fn push_subscription(&self) -> Result<Option<Value>> {
      self.push.clone().map_err(|message| anyhow!(message))
    }
  }

  #[tokio::test]
  async fn reports_absent_values_explicitly() {
    let probe = FixedProbe {
      script: None,
      scope: None,
      ..FixedProbe::default()
    };
    let report = inspect_service_worker(&probe, Duration::from_secs(1))
      .await
      .unwrap();

    assert_eq!(report, ServiceWorkerReport::default());
    assert_eq!(
      serde_json::to_value(&report).unwrap(),
      json!({ "hasSW": null, "scope": null, "pushReg": null })
    );
  }

  #[tokio::test]
  async fn successful_probe_is_ok_response() {
    let probe = FixedProbe {
      push: Ok(Some(json!({ "endpoint": "https://push.example.com/abc" }))),
      ..FixedProbe::default()
    };
    let response = service_worker_response(&probe, "https://example.com", Duration::from_secs(1)).await;

    assert_eq!(response.status, 200);
    assert_eq!(
      serde_json::to_value(&response.body).unwrap()["data"]["pushReg"]["endpoint"],
      json!("https://push.example.com/abc")
    );
  }

  #[tokio::test(start_paused = true)]
  async fn stalled_stage_times_out_with_500() {
    let probe = FixedProbe {
      stall_scope: true,
      ..FixedProbe::default()
    };

    let err = inspect_service_worker(&probe, Duration::from_secs(120))
      .await
      .unwrap_err();
    assert!(matches!(err, InspectionError::Timeout { stage: ProbeStage::Scope, .. }));

    let response = service_worker_response(&probe, "https://example.com", Duration::from_secs(120)).await;
    assert_eq!(response.status, 500);
  }

  #[tokio::test]
  async fn probe_error_is_400() {
    let probe = FixedProbe {
      push: Err("page crashed".to_string()),
      ..FixedProbe::default()
    };
    let response = service_worker_response(&probe, "https://example.com", Duration::from_secs(1)).await;

    assert_eq!(response.status, 400);
    assert_eq!(
      serde_json::to_value(&response.body).unwrap()["error"],
      json!("push subscription probe failed: page crashed")
    );
  }
}
