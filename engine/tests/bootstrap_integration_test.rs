//! Integration tests for RuntimeBootstrapAdapter
//!
//! These tests drive the adapter with a recorder entry point that records
//! every start, close, and action so that ordering and the close-once
//! guarantee can be checked from the outside.

use genrunner_engine::runtime::{
    BootstrapState, ContextBuilder, EntryPointRegistry, RuntimeBootstrapAdapter,
};
use sdk::{
    BootstrapConfig, BootstrapPhase, ContextError, ContextSettings, EntryPoint, GenerateError,
    ManagedContext, RunnerError,
};
use std::error::Error as _;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Service registered by the recorder; carries the number of the start that created it
struct Generation(usize);

/// Service that records when its context lets go of it
struct Lease {
    generation: usize,
    events: Arc<Mutex<Vec<String>>>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.events
            .lock()
            .unwrap()
            .push(format!("release {}", self.generation));
    }
}

#[derive(Default)]
struct RecorderOptions {
    fail_start: bool,
    fail_close: bool,
    skip_service: bool,
    lease: bool,
}

struct Recorder {
    options: RecorderOptions,
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn log(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.log().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

struct RecordingEntryPoint(Arc<Recorder>);

impl EntryPoint for RecordingEntryPoint {
    fn name(&self) -> &str {
        "recorder"
    }

    fn start(&self, settings: &ContextSettings) -> Result<Box<dyn ManagedContext>, ContextError> {
        let recorder = &self.0;
        let generation = recorder.count("start") + 1;
        recorder.events.lock().unwrap().push(format!(
            "start {} headless={} profiles={}",
            generation,
            settings.headless,
            settings.profiles.join(",")
        ));

        if recorder.options.fail_start {
            return Err(ContextError::Startup("port already bound".to_string()));
        }

        let mut builder = ContextBuilder::new("recorder", settings);
        if !recorder.options.skip_service {
            builder.register(Generation(generation));
        }
        if recorder.options.lease {
            builder.register(Lease {
                generation,
                events: Arc::clone(&recorder.events),
            });
        }
        let events = Arc::clone(&recorder.events);
        let fail_close = recorder.options.fail_close;
        builder.on_shutdown("recorder", move || {
            events.lock().unwrap().push(format!("close {}", generation));
            if fail_close {
                Err(ContextError::Shutdown("connection pool stuck".to_string()))
            } else {
                Ok(())
            }
        });
        Ok(Box::new(builder.build()))
    }
}

fn setup(options: RecorderOptions) -> (RuntimeBootstrapAdapter, Arc<Recorder>) {
    let recorder = Arc::new(Recorder {
        options,
        events: Arc::new(Mutex::new(Vec::new())),
    });
    let mut registry = EntryPointRegistry::new();
    registry.register(RecordingEntryPoint(Arc::clone(&recorder)));
    (RuntimeBootstrapAdapter::new(Arc::new(registry)), recorder)
}

fn valid_config() -> BootstrapConfig {
    BootstrapConfig::new("recorder", "codegen")
}

fn io_failure() -> GenerateError {
    GenerateError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
}

#[test]
fn test_missing_entry_point_is_configuration_error() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());
    let config = BootstrapConfig {
        entry_point: None,
        profile: Some("codegen".to_string()),
    };

    let err = adapter
        .run_with::<Generation, _>(&config, |_| Ok(()))
        .unwrap_err();

    assert!(matches!(err, RunnerError::Configuration(ref msg) if msg.contains("entry_point")));
    assert!(recorder.log().is_empty());
    assert_eq!(adapter.last_state(), BootstrapState::Failed);
}

#[test]
fn test_empty_profile_is_configuration_error() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());
    let config = BootstrapConfig::new("recorder", "");

    let err = adapter
        .run_with::<Generation, _>(&config, |_| Ok(()))
        .unwrap_err();

    assert!(matches!(err, RunnerError::Configuration(ref msg) if msg.contains("profile")));
    assert!(recorder.log().is_empty());
}

#[test]
fn test_unknown_entry_point() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());
    let config = BootstrapConfig::new("com.example.MissingConfig", "codegen");

    let err = adapter
        .run_with::<Generation, _>(&config, |_| Ok(()))
        .unwrap_err();

    assert!(matches!(err, RunnerError::EntryPointNotFound(ref id) if id == "com.example.MissingConfig"));
    assert!(recorder.log().is_empty());
    assert_eq!(adapter.last_state(), BootstrapState::Failed);
}

#[test]
fn test_success_runs_action_then_closes_once() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());
    let events = Arc::clone(&recorder.events);

    adapter
        .run_with::<Generation, _>(&valid_config(), |generation| {
            events
                .lock()
                .unwrap()
                .push(format!("action {}", generation.0));
            Ok(())
        })
        .unwrap();

    assert_eq!(
        recorder.log(),
        vec![
            "start 1 headless=true profiles=codegen",
            "action 1",
            "close 1"
        ]
    );
    assert_eq!(adapter.last_state(), BootstrapState::Closed);
}

#[test]
fn test_action_error_closes_then_wraps() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());

    let err = adapter
        .run_with::<Generation, _>(&valid_config(), |_| Err(io_failure()))
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::Action));
    let source = err.source().expect("cause preserved");
    let cause = source.downcast_ref::<GenerateError>().expect("generate error");
    assert!(matches!(cause, GenerateError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied));
    assert_eq!(recorder.count("close"), 1);
    assert_eq!(adapter.last_state(), BootstrapState::Closed);
}

#[test]
fn test_startup_failure_never_closes() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        fail_start: true,
        ..Default::default()
    });

    let err = adapter
        .run_with::<Generation, _>(&valid_config(), |_| Ok(()))
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::Startup));
    assert!(err.to_string().contains("port already bound"));
    assert_eq!(recorder.count("start"), 1);
    assert_eq!(recorder.count("close"), 0);
    assert_eq!(adapter.last_state(), BootstrapState::Failed);
}

#[test]
fn test_missing_service_closes_once() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        skip_service: true,
        ..Default::default()
    });
    let mut action_ran = false;

    let err = adapter
        .run_with::<Generation, _>(&valid_config(), |_| {
            action_ran = true;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::ServiceResolution));
    assert!(!action_ran);
    assert_eq!(recorder.count("close"), 1);
}

#[test]
fn test_close_failure_does_not_mask_action_error() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        fail_close: true,
        ..Default::default()
    });

    let err = adapter
        .run_with::<Generation, _>(&valid_config(), |_| Err(io_failure()))
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::Action));
    assert_eq!(recorder.count("close"), 1);
}

#[test]
fn test_close_failure_after_success_is_reported() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        fail_close: true,
        ..Default::default()
    });

    let err = adapter
        .run_with::<Generation, _>(&valid_config(), |_| Ok(()))
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::Shutdown));
    assert!(err.to_string().contains("connection pool stuck"));
    assert_eq!(recorder.count("close"), 1);
    assert_eq!(adapter.last_state(), BootstrapState::Closed);
}

#[test]
fn test_repeated_runs_use_independent_contexts() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());
    let mut seen = Vec::new();

    for _ in 0..3 {
        adapter
            .run_with::<Generation, _>(&valid_config(), |generation| {
                seen.push(generation.0);
                Ok(())
            })
            .unwrap();
    }

    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(recorder.count("start"), 3);
    assert_eq!(recorder.count("close"), 3);
    assert_eq!(
        recorder.log(),
        vec![
            "start 1 headless=true profiles=codegen",
            "close 1",
            "start 2 headless=true profiles=codegen",
            "close 2",
            "start 3 headless=true profiles=codegen",
            "close 3",
        ]
    );
}

#[test]
fn test_panicking_action_still_closes() {
    let (mut adapter, recorder) = setup(RecorderOptions::default());

    let result = catch_unwind(AssertUnwindSafe(|| {
        adapter.run_with::<Generation, _>(&valid_config(), |_| panic!("generator bug"))
    }));

    assert!(result.is_err());
    assert_eq!(recorder.count("close"), 1);
}

#[test]
fn test_panicking_action_records_closed_state() {
    let (mut adapter, _recorder) = setup(RecorderOptions::default());
    let _ = adapter.run_with::<Generation, _>(&BootstrapConfig::default(), |_| Ok(()));
    assert_eq!(adapter.last_state(), BootstrapState::Failed);

    let result = catch_unwind(AssertUnwindSafe(|| {
        adapter.run_with::<Generation, _>(&valid_config(), |_| panic!("generator bug"))
    }));

    assert!(result.is_err());
    assert_eq!(adapter.last_state(), BootstrapState::Closed);
}

#[test]
fn test_services_released_before_run_returns() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        lease: true,
        ..Default::default()
    });
    let events = Arc::clone(&recorder.events);

    for _ in 0..2 {
        adapter
            .run_with::<Lease, _>(&valid_config(), |lease| {
                events
                    .lock()
                    .unwrap()
                    .push(format!("action {}", lease.generation));
                Ok(())
            })
            .unwrap();
        assert_eq!(
            recorder.log().last().map(String::as_str),
            Some(format!("release {}", recorder.count("start")).as_str())
        );
    }

    assert_eq!(
        recorder.log(),
        vec![
            "start 1 headless=true profiles=codegen",
            "action 1",
            "close 1",
            "release 1",
            "start 2 headless=true profiles=codegen",
            "action 2",
            "close 2",
            "release 2",
        ]
    );
}

#[test]
fn test_services_released_when_action_fails() {
    let (mut adapter, recorder) = setup(RecorderOptions {
        lease: true,
        ..Default::default()
    });

    let err = adapter
        .run_with::<Lease, _>(&valid_config(), |_| Err(io_failure()))
        .unwrap_err();

    assert_eq!(err.phase(), Some(BootstrapPhase::Action));
    assert_eq!(recorder.count("release"), 1);
}
