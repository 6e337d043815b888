//! End-to-end tests for the synchronization supervisor, driven by a
//! scripted in-memory registry and tokio's paused clock.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::time::{sleep, timeout};

use iotly_core::{
    CoreError, Device, DeviceFilter, DeviceId, DeviceMode, Notice, Registry, Supervisor,
    SyncConfig,
};

const WAIT: Duration = Duration::from_secs(30);

/// One scripted response to a `list` call.
#[derive(Clone)]
enum ListStep {
    Devices(Vec<Device>),
    Unreachable,
}

/// In-memory registry with a scripted `list` outcome queue.
///
/// The queue's last entry repeats forever, so a script of
/// `[Unreachable]` fails every poll and `[a, b]` answers `a` once and
/// `b` from then on. Mutations echo their input and can be switched to
/// fail wholesale.
#[derive(Default)]
struct ScriptedRegistry {
    list_script: Mutex<VecDeque<ListStep>>,
    mutations_fail: AtomicBool,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    set_switch_calls: AtomicUsize,
    rename_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl ScriptedRegistry {
    fn new(script: Vec<ListStep>) -> Arc<Self> {
        Arc::new(Self {
            list_script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    /// Replace the remaining `list` script.
    fn set_list_response(&self, devices: Vec<Device>) {
        let mut script = self.list_script.lock().unwrap();
        script.clear();
        script.push_back(ListStep::Devices(devices));
    }

    fn fail_mutations(&self) {
        self.mutations_fail.store(true, Ordering::SeqCst);
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn unreachable() -> CoreError {
        CoreError::RegistryUnreachable {
            reason: "connection refused".into(),
        }
    }

    fn check_mutation(&self) -> Result<(), CoreError> {
        if self.mutations_fail.load(Ordering::SeqCst) {
            Err(Self::unreachable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Registry for ScriptedRegistry {
    async fn list(&self) -> Result<Vec<Device>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut script = self.list_script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };
        match step {
            Some(ListStep::Devices(devices)) => Ok(devices),
            Some(ListStep::Unreachable) | None => Err(Self::unreachable()),
        }
    }

    async fn create(&self, mode: DeviceMode) -> Result<Device, CoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation()?;
        let mut device = controller("Device7", false);
        device.mode = mode;
        Ok(device)
    }

    async fn set_switch(&self, name: &str, on: bool) -> Result<Device, CoreError> {
        self.set_switch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation()?;
        Ok(controller(name, on))
    }

    async fn rename(&self, _id: &DeviceId, name: &str) -> Result<Device, CoreError> {
        self.rename_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation()?;
        Ok(controller(name, false))
    }

    async fn delete(&self, _name: &str) -> Result<(), CoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_mutation()
    }
}

fn controller(name: &str, switch_on: bool) -> Device {
    Device {
        id: DeviceId::from(name),
        name: name.into(),
        mode: DeviceMode::Controller,
        switch_on,
        sensor_value: None,
        online: true,
        last_online: None,
    }
}

/// Steady cadence only; recovery effectively disabled.
fn steady_only() -> SyncConfig {
    SyncConfig {
        steady_interval: Duration::from_secs(2),
        recovery_interval: Duration::from_secs(3600),
    }
}

/// Recovery cadence only; steady refresh effectively disabled (the
/// steady task still runs the initial poll).
fn recovery_only() -> SyncConfig {
    SyncConfig {
        steady_interval: Duration::from_secs(3600),
        recovery_interval: Duration::from_secs(3),
    }
}

/// Drain every notice currently queued on the receiver.
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        out.push(notice);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn initial_poll_populates_the_collection() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![
        controller("Fan1", false),
        controller("Lamp1", true),
    ])]);
    let supervisor = Supervisor::spawn(registry.clone(), steady_only());
    let mut devices = supervisor.devices();
    let busy = supervisor.busy();
    assert!(*busy.borrow(), "busy until the initial load completes");

    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    let snapshot = supervisor.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.get_by_name("Fan1").is_some());
    assert!(!*busy.borrow());
    assert!(supervisor.health().borrow().is_healthy());

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn late_busy_subscriber_sees_the_settled_flag() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry, steady_only());

    // No busy receiver exists while the initial foreground poll runs.
    let mut devices = supervisor.devices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    // Subscribing only now must still observe the settled value, not
    // the stale initial `true`.
    assert!(
        !*supervisor.busy().borrow(),
        "idle healthy engine must not report busy"
    );

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn steady_cadence_refreshes_without_busy_flicker() {
    let registry = ScriptedRegistry::new(vec![
        ListStep::Devices(vec![controller("Fan1", false)]),
        ListStep::Devices(vec![controller("Fan1", false), controller("Lamp1", true)]),
    ]);
    let supervisor = Supervisor::spawn(registry.clone(), steady_only());
    let mut devices = supervisor.devices();

    timeout(WAIT, devices.changed()).await.unwrap().unwrap();
    assert_eq!(supervisor.snapshot().len(), 1);

    // Next steady tick picks up the second scripted response.
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();
    assert_eq!(supervisor.snapshot().len(), 2);
    assert!(!*supervisor.busy().borrow(), "steady polls are silent");
    assert!(registry.list_calls() >= 2);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_degrade_once_and_clear_the_collection() {
    let registry = ScriptedRegistry::new(vec![ListStep::Unreachable]);
    let supervisor = Supervisor::spawn(registry.clone(), steady_only());
    let mut notices = supervisor.notices();
    let mut health = supervisor.health();

    timeout(WAIT, health.changed()).await.unwrap().unwrap();
    assert!(!health.borrow().is_healthy());

    // Let several more failing polls run on the steady cadence.
    sleep(Duration::from_secs(10)).await;
    assert!(registry.list_calls() >= 4);

    assert!(supervisor.snapshot().is_empty());
    let seen = drain(&mut notices);
    assert_eq!(
        seen,
        vec![Notice::ConnectionLost {
            message: "registry unreachable: connection refused".into()
        }],
        "degradation must notify exactly once"
    );

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn recovery_cadence_restores_health_with_one_reconnected() {
    let registry = ScriptedRegistry::new(vec![
        ListStep::Unreachable,
        ListStep::Devices(vec![controller("Fan1", false)]),
    ]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut notices = supervisor.notices();
    let mut health = supervisor.health();

    // Initial poll fails.
    timeout(WAIT, health.changed()).await.unwrap().unwrap();
    assert!(!health.borrow().is_healthy());

    // The recovery cadence retries and succeeds.
    timeout(WAIT, health.changed()).await.unwrap().unwrap();
    assert!(health.borrow().is_healthy());
    assert_eq!(supervisor.snapshot().len(), 1);

    let seen = drain(&mut notices);
    assert_eq!(
        seen,
        vec![
            Notice::ConnectionLost {
                message: "registry unreachable: connection refused".into()
            },
            Notice::Reconnected,
        ]
    );

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn recovery_cadence_is_a_noop_while_healthy() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut devices = supervisor.devices();

    timeout(WAIT, devices.changed()).await.unwrap().unwrap();
    assert_eq!(registry.list_calls(), 1);

    // Many recovery ticks pass; none of them polls while healthy.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(registry.list_calls(), 1);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn successful_toggle_is_confirmed_by_a_silent_poll() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut devices = supervisor.devices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    let fan = supervisor.snapshot().get_by_name("Fan1").cloned().unwrap();
    assert!(!fan.switch_on);
    assert_eq!(
        DeviceFilter::SwitchOff.apply(&supervisor.snapshot()).len(),
        1
    );

    // The registry will confirm the new state on the next poll.
    registry.set_list_response(vec![controller("Fan1", true)]);

    let notice = supervisor.toggle_switch(&fan).await.unwrap();
    assert_eq!(
        notice,
        Notice::SwitchSet {
            name: "Fan1".into(),
            on: true
        }
    );

    // Collection catches up via the on-demand silent poll, not via an
    // optimistic local write.
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();
    let snapshot = supervisor.snapshot();
    assert!(snapshot.get_by_name("Fan1").unwrap().switch_on);
    assert_eq!(DeviceFilter::SwitchOn.apply(&snapshot).len(), 1);
    assert_eq!(DeviceFilter::SwitchOff.apply(&snapshot).len(), 0);
    assert!(!*supervisor.busy().borrow(), "confirmation poll is silent");

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_toggle_leaves_the_collection_untouched() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut devices = supervisor.devices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    let before = supervisor.snapshot();
    let fan = before.get_by_name("Fan1").cloned().unwrap();

    registry.fail_mutations();
    let err = supervisor.toggle_switch(&fan).await.unwrap_err();
    assert!(matches!(err, CoreError::RegistryUnreachable { .. }));

    // No optimistic write, no confirmation poll for a failed command.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(*before, *supervisor.snapshot());
    assert_eq!(registry.list_calls(), 1);
    assert_eq!(registry.set_switch_calls.load(Ordering::SeqCst), 1);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn rename_to_the_same_name_short_circuits() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut devices = supervisor.devices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    let fan = supervisor.snapshot().get_by_name("Fan1").cloned().unwrap();
    let outcome = supervisor.rename(&fan, "Fan1").await.unwrap();
    assert_eq!(outcome, None);
    assert_eq!(registry.rename_calls.load(Ordering::SeqCst), 0);

    // A changed name does go through.
    let notice = supervisor.rename(&fan, "Ceiling Fan").await.unwrap();
    assert_eq!(
        notice,
        Some(Notice::Renamed {
            from: "Fan1".into(),
            to: "Ceiling Fan".into()
        })
    );
    assert_eq!(registry.rename_calls.load(Ordering::SeqCst), 1);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn create_and_delete_broadcast_notices() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), recovery_only());
    let mut devices = supervisor.devices();
    let mut notices = supervisor.notices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    let created = supervisor
        .create_device(DeviceMode::Controller)
        .await
        .unwrap();
    assert_eq!(
        created,
        Notice::DeviceCreated {
            name: "Device7".into()
        }
    );

    let fan = supervisor.snapshot().get_by_name("Fan1").cloned().unwrap();
    let deleted = supervisor.delete(&fan).await.unwrap();
    assert_eq!(
        deleted,
        Notice::Deleted {
            name: "Fan1".into()
        }
    );

    sleep(Duration::from_secs(1)).await;
    let seen = drain(&mut notices);
    assert_eq!(
        seen,
        vec![
            Notice::DeviceCreated {
                name: "Device7".into()
            },
            Notice::Deleted {
                name: "Fan1".into()
            },
        ]
    );

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_all_polling() {
    let registry = ScriptedRegistry::new(vec![ListStep::Devices(vec![controller(
        "Fan1", false,
    )])]);
    let supervisor = Supervisor::spawn(registry.clone(), steady_only());
    let mut devices = supervisor.devices();
    timeout(WAIT, devices.changed()).await.unwrap().unwrap();

    supervisor.shutdown().await;
    let calls = registry.list_calls();

    sleep(Duration::from_secs(30)).await;
    assert_eq!(registry.list_calls(), calls);

    let fan = controller("Fan1", false);
    let err = supervisor.toggle_switch(&fan).await.unwrap_err();
    assert!(matches!(err, CoreError::ShutDown));
}
