use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

use recup_cleaner_core::{
    ActionLog, AppConfig, CleanerEngine, ExtensionRules, MonitorPhase, ProgressReporter, SessionState,
    SilentReporter,
};

fn write_folder(base: &Path, index: u32, files: &[(&str, usize)]) {
    let folder = base.join(format!("recup_dir.{}", index));
    fs::create_dir_all(&folder).unwrap();
    for (name, size) in files {
        fs::write(folder.join(name), vec![0u8; *size]).unwrap();
    }
}

fn jpg_only(base: &Path) -> CleanerEngine {
    CleanerEngine::new(base)
        .with_rules(ExtensionRules::new(["jpg"], Vec::<String>::new()))
        .with_poll_interval(Duration::from_millis(10))
}

#[derive(Default)]
struct PhaseRecorder {
    phases: Mutex<Vec<MonitorPhase>>,
    folders_started: Mutex<Vec<String>>,
}

impl ProgressReporter for PhaseRecorder {
    fn on_phase(&self, phase: MonitorPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_folder_start(&self, folder: &Path) {
        self.folders_started
            .lock()
            .unwrap()
            .push(folder.file_name().unwrap().to_string_lossy().into_owned());
    }
}

#[test]
fn test_tick_idle_when_no_folders() {
    let tmp = tempdir().unwrap();
    let engine = jpg_only(tmp.path());
    let mut state = SessionState::new();

    let report = engine.tick(&mut state, &SilentReporter);
    assert_eq!(report.phase, MonitorPhase::Idle);
    assert!(report.active_folder.is_none());
    assert!(report.finalized.is_empty());
}

#[test]
fn test_tick_idle_when_base_missing() {
    let tmp = tempdir().unwrap();
    let engine = jpg_only(&tmp.path().join("not_there"));
    let mut state = SessionState::new();

    assert_eq!(engine.tick(&mut state, &SilentReporter).phase, MonitorPhase::Idle);
}

#[test]
fn test_tick_leaves_single_active_folder_alone() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    let engine = jpg_only(tmp.path());
    let mut state = SessionState::new();

    let report = engine.tick(&mut state, &SilentReporter);
    assert_eq!(report.phase, MonitorPhase::Monitoring);
    assert_eq!(report.active_folder, Some(tmp.path().join("recup_dir.1")));
    assert!(report.finalized.is_empty());
    assert!(tmp.path().join("recup_dir.1").join("b.tmp").exists());
    assert_eq!(state.deleted_count(), 0);
}

#[test]
fn test_tick_finalizes_all_but_newest_in_numeric_order() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 2, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 9, &[("c.jpg", 10), ("d.tmp", 30)]);
    write_folder(tmp.path(), 10, &[("e.jpg", 10), ("f.tmp", 40)]);

    let engine = jpg_only(tmp.path());
    let recorder = PhaseRecorder::default();
    let mut state = SessionState::new();

    let report = engine.tick(&mut state, &recorder);
    assert_eq!(report.phase, MonitorPhase::Finalizing);
    assert_eq!(report.active_folder, Some(tmp.path().join("recup_dir.10")));
    assert_eq!(
        report.finalized,
        vec![tmp.path().join("recup_dir.2"), tmp.path().join("recup_dir.9")]
    );
    assert_eq!(
        *recorder.folders_started.lock().unwrap(),
        vec!["recup_dir.2", "recup_dir.9"]
    );

    assert_eq!(state.deleted_count(), 2);
    assert_eq!(state.deleted_bytes(), 50);
    assert_eq!(state.kept_count(), 2);
    assert!(!state.is_finalized(&tmp.path().join("recup_dir.10")));
    assert!(tmp.path().join("recup_dir.10").join("f.tmp").exists());
}

#[test]
fn test_second_tick_without_new_folders_is_a_no_op() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 2, &[("c.jpg", 10)]);

    let engine = jpg_only(tmp.path());
    let mut state = SessionState::new();

    engine.tick(&mut state, &SilentReporter);
    let before = state.stats();

    let report = engine.tick(&mut state, &SilentReporter);
    assert!(report.finalized.is_empty());
    assert_eq!(state.stats(), before);
}

#[test]
fn test_finalized_folder_is_never_revisited() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10)]);
    write_folder(tmp.path(), 2, &[("b.jpg", 10)]);

    let engine = jpg_only(tmp.path());
    let recorder = PhaseRecorder::default();
    let mut state = SessionState::new();
    engine.tick(&mut state, &recorder);

    // Files dropped into an already finalized folder stay untouched.
    fs::write(tmp.path().join("recup_dir.1").join("late.tmp"), vec![0u8; 5]).unwrap();
    write_folder(tmp.path(), 3, &[]);
    engine.tick(&mut state, &recorder);

    assert_eq!(
        *recorder.folders_started.lock().unwrap(),
        vec!["recup_dir.1", "recup_dir.2"]
    );
    assert!(tmp.path().join("recup_dir.1").join("late.tmp").exists());
}

#[test]
fn test_run_stops_when_flag_set() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 2, &[("c.tmp", 20)]);

    let engine = jpg_only(tmp.path());
    let stop = Arc::new(AtomicBool::new(false));

    let worker = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut state = SessionState::new();
            let recorder = PhaseRecorder::default();
            let ticks = engine.run(&mut state, &recorder, &stop);
            let last_phase = *recorder.phases.lock().unwrap().last().unwrap();
            (state, ticks, last_phase)
        })
    };

    thread::sleep(Duration::from_millis(100));
    stop.store(true, Ordering::Relaxed);
    let (state, ticks, last_phase) = worker.join().unwrap();

    assert!(ticks >= 1);
    assert_eq!(last_phase, MonitorPhase::Stopped);
    assert!(state.is_finalized(&tmp.path().join("recup_dir.1")));
    assert!(!state.is_finalized(&tmp.path().join("recup_dir.2")));
    assert_eq!(state.deleted_count(), 1);
}

#[test]
fn test_run_returns_immediately_when_cancelled() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.tmp", 10)]);
    write_folder(tmp.path(), 2, &[]);

    let engine = jpg_only(tmp.path());
    let mut state = SessionState::new();
    state.cancel();

    let ticks = engine.run(&mut state, &SilentReporter, &AtomicBool::new(false));
    assert_eq!(ticks, 0);
    assert!(tmp.path().join("recup_dir.1").join("a.tmp").exists());
}

#[test]
fn test_finish_takes_active_folder_and_reorganizes() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 2, &[("c.jpg", 10), ("d.tmp", 30)]);

    let engine = jpg_only(tmp.path()).with_batch_size(10);
    let mut state = SessionState::new();
    engine.tick(&mut state, &SilentReporter);

    let report = engine.finish(&mut state, &SilentReporter);
    assert_eq!(report.finalized, vec![tmp.path().join("recup_dir.2")]);
    assert_eq!(report.stats.kept_count, 2);
    assert_eq!(report.stats.deleted_count, 2);
    assert_eq!(report.stats.deleted_bytes, 50);

    let reorganize = report.reorganize.unwrap();
    assert_eq!(reorganize.files_moved, 2);
    assert_eq!(reorganize.source_folders_removed, 2);

    let bucket = tmp.path().join("jpg").join("1");
    assert!(bucket.join("a.jpg").exists());
    assert!(bucket.join("c.jpg").exists());
    assert!(!tmp.path().join("recup_dir.1").exists());
    assert!(!tmp.path().join("recup_dir.2").exists());
}

#[test]
fn test_finish_without_reorganize_leaves_layout() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);

    let engine = jpg_only(tmp.path()).with_reorganize(false);
    let mut state = SessionState::new();
    let report = engine.finish(&mut state, &SilentReporter);

    assert!(report.reorganize.is_none());
    assert!(tmp.path().join("recup_dir.1").join("a.jpg").exists());
    assert!(!tmp.path().join("recup_dir.1").join("b.tmp").exists());
}

#[test]
fn test_clean_once_processes_every_folder() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 2, &[("c.pdf", 10)]);
    write_folder(tmp.path(), 3, &[("d.jpg", 10)]);

    let engine = jpg_only(tmp.path()).with_reorganize(false);
    let mut state = SessionState::new();
    let report = engine.clean_once(&mut state, &SilentReporter);

    assert_eq!(report.finalized.len(), 3);
    assert_eq!(report.stats.folders_finalized, 3);
    assert_eq!(report.stats.kept_count, 2);
    assert_eq!(report.stats.deleted_count, 2);
    assert!(!report.cancelled);
}

#[test]
fn test_clean_once_after_tick_starts_from_scratch() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    write_folder(tmp.path(), 2, &[("c.jpg", 10), ("d.tmp", 30)]);

    let engine = jpg_only(tmp.path()).with_reorganize(false);
    let mut state = SessionState::new();
    let tick = engine.tick(&mut state, &SilentReporter);
    assert_eq!(tick.finalized, vec![tmp.path().join("recup_dir.1")]);

    let report = engine.clean_once(&mut state, &SilentReporter);
    assert_eq!(
        report.finalized,
        vec![tmp.path().join("recup_dir.1"), tmp.path().join("recup_dir.2")]
    );
    assert_eq!(report.stats.folders_finalized, 2);
    // recup_dir.1 lost its .tmp on the tick, so the one-shot pass only sees
    // the kept jpg there.
    assert_eq!(report.stats.kept_count, 2);
    assert_eq!(report.stats.deleted_count, 1);
    assert_eq!(report.stats.deleted_bytes, 30);
    assert_eq!(state.retained_count(), 2);
}

#[test]
fn test_clean_once_keeps_action_log_attached() {
    let tmp = tempdir().unwrap();
    write_folder(tmp.path(), 1, &[("a.jpg", 10), ("b.tmp", 20)]);
    let log_path = tmp.path().join("actions.csv");

    let engine = jpg_only(tmp.path()).with_reorganize(false);
    let mut state = SessionState::new().with_action_log(ActionLog::create(&log_path).unwrap());
    engine.clean_once(&mut state, &SilentReporter);

    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn test_from_config_requires_base_dir() {
    let config = AppConfig::default();
    assert!(CleanerEngine::from_config(&config).is_err());

    let tmp = tempdir().unwrap();
    let config = AppConfig {
        base_dir: Some(tmp.path().to_path_buf()),
        keep_extensions: vec!["jpg".to_string()],
        ..AppConfig::default()
    };
    let engine = CleanerEngine::from_config(&config).unwrap();
    assert_eq!(engine.base_dir(), tmp.path());
    assert!(engine.rules().keep_set().contains("jpg"));
}
