//! Start/stop commands for monitored containers.
//!
//! Commands are fire-and-forget: [`ControlDispatcher::dispatch`] validates
//! the request, issues the runtime call on a background task and schedules a
//! status re-poll. Until that poll runs, published snapshots still show the
//! pre-command state.

use crate::config::{ControlConfig, ServiceDescriptor};
use crate::health::PollTrigger;
use crate::runtime::{locate_container, ContainerRuntime, RuntimeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// A lifecycle command for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Start,
    Stop,
}

impl FromStr for ControlAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(ControlError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("service not configured: {0}")]
    ServiceNotConfigured(String),

    #[error("unknown action '{0}', expected start or stop")]
    UnknownAction(String),

    #[error("remote control is disabled")]
    Disabled,

    #[error("no container found for service '{0}'")]
    NotFound(String),

    #[error("runtime command failed: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Issues control commands and the follow-up re-poll.
#[derive(Clone)]
pub struct ControlDispatcher {
    runtime: Arc<dyn ContainerRuntime>,
    services: Arc<[ServiceDescriptor]>,
    trigger: PollTrigger,
    enabled: bool,
    repoll_delay: Duration,
}

impl ControlDispatcher {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        services: Arc<[ServiceDescriptor]>,
        trigger: PollTrigger,
        config: &ControlConfig,
    ) -> Self {
        Self {
            runtime,
            services,
            trigger,
            enabled: config.enabled,
            repoll_delay: Duration::from_secs(config.repoll_delay_seconds),
        }
    }

    /// Validate and issue a command in the background.
    ///
    /// Returns as soon as the command task is spawned. The task resolves to
    /// the command's outcome after the re-poll has been requested.
    pub fn dispatch(
        &self,
        service_id: &str,
        action: ControlAction,
    ) -> Result<JoinHandle<Result<(), ControlError>>, ControlError> {
        if !self.enabled {
            return Err(ControlError::Disabled);
        }
        let service = self.service(service_id)?.clone();

        tracing::info!(service_id = %service.id, action = %action, "Control command accepted");

        let dispatcher = self.clone();
        Ok(tokio::spawn(async move {
            let result = dispatcher.execute(&service, action).await;
            crate::metrics::record_control(action, &result);
            if let Err(e) = &result {
                tracing::warn!(
                    service_id = %service.id,
                    action = %action,
                    error = %e,
                    "Control command failed"
                );
            }

            tokio::time::sleep(dispatcher.repoll_delay).await;
            dispatcher.trigger.poll_now();
            result
        }))
    }

    /// Run a command against the service's container and wait for the runtime.
    pub async fn execute(
        &self,
        service: &ServiceDescriptor,
        action: ControlAction,
    ) -> Result<(), ControlError> {
        let container = locate_container(self.runtime.as_ref(), &service.container_name)
            .await?
            .ok_or_else(|| ControlError::NotFound(service.id.clone()))?;

        match action {
            ControlAction::Start => self.runtime.start_container(&container.id).await?,
            ControlAction::Stop => self.runtime.stop_container(&container.id).await?,
        }

        tracing::info!(
            service_id = %service.id,
            container = %container.id,
            action = %action,
            "Control command completed"
        );
        Ok(())
    }

    fn service(&self, service_id: &str) -> Result<&ServiceDescriptor, ControlError> {
        self.services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| ControlError::ServiceNotConfigured(service_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::FakeRuntime;

    fn dispatcher(runtime: FakeRuntime, config: ControlConfig) -> (ControlDispatcher, PollTrigger) {
        let trigger = PollTrigger::new();
        let services: Arc<[ServiceDescriptor]> = crate::config::default_services().into();
        let dispatcher =
            ControlDispatcher::new(Arc::new(runtime), services, trigger.clone(), &config);
        (dispatcher, trigger)
    }

    fn no_delay() -> ControlConfig {
        ControlConfig {
            enabled: true,
            repoll_delay_seconds: 0,
        }
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("start".parse::<ControlAction>().unwrap(), ControlAction::Start);
        assert_eq!("STOP".parse::<ControlAction>().unwrap(), ControlAction::Stop);
        assert!(matches!(
            "restart".parse::<ControlAction>(),
            Err(ControlError::UnknownAction(_))
        ));
        assert_eq!(ControlAction::Stop.to_string(), "stop");
    }

    #[tokio::test]
    async fn test_dispatch_issues_command() {
        let runtime = FakeRuntime::new().with_container("c1", "paladium-rtsp-server-1", "exited");
        let commands = runtime.commands();
        let (dispatcher, _trigger) = dispatcher(runtime, no_delay());

        let handle = dispatcher.dispatch("rtsp-server", ControlAction::Start).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(
            commands.lock().unwrap().as_slice(),
            &[("c1".to_string(), "start".to_string())]
        );
    }

    #[tokio::test]
    async fn test_dispatch_triggers_repoll() {
        let runtime = FakeRuntime::new().with_container("c1", "paladium-rtsp-server-1", "running");
        let (dispatcher, trigger) = dispatcher(runtime, no_delay());

        dispatcher
            .dispatch("rtsp-server", ControlAction::Stop)
            .unwrap()
            .await
            .unwrap()
            .unwrap();

        // The stored permit makes this resolve at once
        tokio::time::timeout(Duration::from_millis(100), trigger.requested())
            .await
            .expect("re-poll should have been requested");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_service() {
        let (dispatcher, _) = dispatcher(FakeRuntime::new(), no_delay());
        let err = dispatcher.dispatch("ghost", ControlAction::Start).unwrap_err();
        assert!(matches!(err, ControlError::ServiceNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_dispatch_disabled() {
        let config = ControlConfig {
            enabled: false,
            ..Default::default()
        };
        let (dispatcher, _) = dispatcher(FakeRuntime::new(), config);
        let err = dispatcher.dispatch("rtsp-server", ControlAction::Start).unwrap_err();
        assert!(matches!(err, ControlError::Disabled));
    }

    #[tokio::test]
    async fn test_missing_container_still_repolls() {
        let (dispatcher, trigger) = dispatcher(FakeRuntime::new(), no_delay());

        let result = dispatcher
            .dispatch("rtsp-to-srt", ControlAction::Start)
            .unwrap()
            .await
            .unwrap();

        assert!(matches!(result, Err(ControlError::NotFound(_))));
        tokio::time::timeout(Duration::from_millis(100), trigger.requested())
            .await
            .expect("re-poll should have been requested");
    }
}
