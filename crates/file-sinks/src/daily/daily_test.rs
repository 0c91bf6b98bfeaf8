use super::*;
use chrono::{TimeDelta, TimeZone};
use parking_lot::Mutex;
use std::fs;
use std::thread;
use tempfile::TempDir;

/// Clock that only moves when told to
struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    fn at(now: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    fn set(&self, now: DateTime<Local>) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

fn at(day: u32, h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, h, m, 0).single().unwrap()
}

fn base_in(dir: &TempDir) -> String {
    dir.path().join("app").to_string_lossy().into_owned()
}

fn timestamped_sink(
    dir: &TempDir,
    rotation: RotationTime,
    clock: &Arc<ManualClock>,
) -> DailyFileSinkMt {
    DailyFileSink::with_options(
        PathSpec::new(base_in(dir), "txt"),
        rotation,
        TimestampedFilename,
        clock.clone(),
    )
    .unwrap()
}

fn read_string(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

// =============================================================================
// Construction tests
// =============================================================================

#[test]
fn test_invalid_hour_opens_no_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let filename = format!("{}.txt", base_in(&temp_dir));

    let result: Result<DailyFileSinkMt> = DailyFileSink::new(&filename, 24, 0);

    assert!(matches!(
        result,
        Err(SinkError::InvalidRotationTime { hour: 24, .. })
    ));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_minute_opens_no_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let result: Result<DailyFileSinkSt> =
        DailyFileSink::with_base(base_in(&temp_dir), "txt", 0, 60);

    assert!(matches!(
        result,
        Err(SinkError::InvalidRotationTime { minute: 60, .. })
    ));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_new_without_extension_defaults_to_txt() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let sink: DailyFileSinkMt = DailyFileSink::new(&base_in(&temp_dir), 0, 0).unwrap();

    assert_eq!(sink.spec().extension(), DEFAULT_EXTENSION);
    let path = sink.current_path();
    assert!(path.exists());
    assert_eq!(path.extension().unwrap(), "txt");
}

#[test]
fn test_opens_timestamped_name_for_now() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));

    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);

    let expected = temp_dir.path().join("app_2024-06-15_10-30.txt");
    assert_eq!(sink.current_path(), expected);
    assert!(expected.exists());
}

#[test]
fn test_opens_date_only_name_for_now() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));

    let sink: DailyFileSinkMt<DateOnlyFilename> = DailyFileSink::with_options(
        PathSpec::new(base_in(&temp_dir), "txt"),
        RotationTime::MIDNIGHT,
        DateOnlyFilename,
        clock,
    )
    .unwrap();

    assert_eq!(
        sink.current_path(),
        temp_dir.path().join("app_2024-06-15.txt")
    );
}

#[test]
fn test_deadline_computed_on_construction() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));

    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);

    assert_eq!(sink.rotation_deadline(), at(16, 0, 0));
    assert_eq!(sink.rotation_time(), RotationTime::MIDNIGHT);
}

#[test]
fn test_construction_appends_to_existing_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let existing = temp_dir.path().join("app_2024-06-15_10-30.txt");
    fs::write(&existing, "earlier\n").unwrap();
    let clock = ManualClock::at(at(15, 10, 30));

    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);
    sink.accept(b"later\n").unwrap();
    sink.flush().unwrap();

    assert_eq!(read_string(&existing), "earlier\nlater\n");
}

// =============================================================================
// Rotation tests
// =============================================================================

#[test]
fn test_accept_before_deadline_keeps_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);
    let first = sink.current_path();

    sink.accept(b"one\n").unwrap();
    clock.set(at(15, 23, 59));
    sink.accept(b"two\n").unwrap();
    sink.flush().unwrap();

    assert_eq!(sink.current_path(), first);
    assert_eq!(read_string(&first), "one\ntwo\n");
    assert_eq!(sink.metrics().rotations, 0);
}

#[test]
fn test_accept_at_deadline_switches_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);
    let first = sink.current_path();

    sink.accept(b"before\n").unwrap();
    clock.set(at(16, 0, 0));
    sink.accept(b"after\n").unwrap();
    sink.flush().unwrap();

    let second = temp_dir.path().join("app_2024-06-16_00-00.txt");
    assert_eq!(sink.current_path(), second);
    assert_eq!(read_string(&first), "before\n");
    assert_eq!(read_string(&second), "after\n");
    assert_eq!(sink.rotation_deadline(), at(17, 0, 0));
    assert_eq!(sink.metrics().rotations, 1);
}

#[test]
fn test_rotation_flushes_old_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);
    let first = sink.current_path();

    sink.accept(b"buffered\n").unwrap();
    clock.set(at(16, 0, 5));
    sink.accept(b"next\n").unwrap();

    // Old file complete without an explicit flush
    assert_eq!(read_string(&first), "buffered\n");
}

#[test]
fn test_late_accept_schedules_from_now() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let rotation = RotationTime::new(6, 0).unwrap();
    let sink = timestamped_sink(&temp_dir, rotation, &clock);
    assert_eq!(sink.rotation_deadline(), at(16, 6, 0));

    // Nothing written for two days
    clock.set(at(18, 9, 15));
    sink.accept(b"x\n").unwrap();

    assert_eq!(
        sink.current_path(),
        temp_dir.path().join("app_2024-06-18_09-15.txt")
    );
    assert_eq!(sink.rotation_deadline(), at(19, 6, 0));
    assert_eq!(sink.metrics().rotations, 1);
}

#[test]
fn test_old_files_are_kept() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);

    for day in 16..20 {
        clock.set(at(day, 0, 0));
        sink.accept(format!("day {day}\n").as_bytes()).unwrap();
    }
    sink.flush().unwrap();

    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 5);
    assert_eq!(
        read_string(temp_dir.path().join("app_2024-06-17_00-00.txt")),
        "day 17\n"
    );
    assert_eq!(sink.metrics().rotations, 4);
}

#[test]
fn test_same_name_rotation_keeps_content() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 8, 0));
    let sink: DailyFileSinkMt<DateOnlyFilename> = DailyFileSink::with_options(
        PathSpec::new(base_in(&temp_dir), "txt"),
        RotationTime::new(12, 0).unwrap(),
        DateOnlyFilename,
        clock.clone(),
    )
    .unwrap();
    let path = sink.current_path();

    sink.accept(b"morning\n").unwrap();
    clock.set(at(15, 12, 30));
    sink.accept(b"afternoon\n").unwrap();
    sink.flush().unwrap();

    assert_eq!(sink.current_path(), path);
    assert_eq!(read_string(&path), "morning\nafternoon\n");
    assert_eq!(sink.rotation_deadline(), at(16, 12, 0));
    assert_eq!(sink.metrics().rotations, 1);
}

#[test]
fn test_open_failure_keeps_old_file_and_retries() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);
    let first = sink.current_path();
    let blocked = temp_dir.path().join("app_2024-06-16_00-00.txt");
    fs::create_dir(&blocked).unwrap();

    clock.set(at(16, 0, 0));
    let err = sink.accept(b"lost\n").unwrap_err();

    match err {
        SinkError::Rotation { op, from, to, .. } => {
            assert_eq!(op, RotationOp::Open);
            assert_eq!(from, first);
            assert_eq!(to, blocked);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sink.current_path(), first);
    assert_eq!(sink.rotation_deadline(), at(16, 0, 0));
    assert_eq!(sink.metrics().write_errors, 1);
    assert_eq!(sink.metrics().rotations, 0);

    // Next accept after the blocker is gone rotates normally
    fs::remove_dir(&blocked).unwrap();
    sink.accept(b"kept\n").unwrap();
    sink.flush().unwrap();

    assert_eq!(sink.current_path(), blocked);
    assert_eq!(read_string(&blocked), "kept\n");
    assert_eq!(sink.metrics().rotations, 1);
}

// =============================================================================
// Metrics and concurrency tests
// =============================================================================

#[test]
fn test_metrics_track_writes_and_flushes() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock);

    sink.accept(b"abc\n").unwrap();
    sink.accept(b"de\n").unwrap();
    sink.flush().unwrap();

    let metrics = sink.metrics();
    assert_eq!(metrics.records_written, 2);
    assert_eq!(metrics.bytes_written, 7);
    assert_eq!(metrics.flush_count, 1);
    assert_eq!(metrics.write_errors, 0);
}

#[test]
fn test_concurrent_accept_across_rotation() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let clock = ManualClock::at(at(15, 10, 30));
    let sink = Arc::new(timestamped_sink(&temp_dir, RotationTime::MIDNIGHT, &clock));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for i in 0..50 {
                    sink.accept(format!("t{t} r{i}\n").as_bytes()).unwrap();
                }
            })
        })
        .collect();

    clock.set(at(16, 0, 0) + TimeDelta::seconds(1));

    for handle in handles {
        handle.join().unwrap();
    }
    sink.accept(b"last\n").unwrap();
    sink.flush().unwrap();

    let total_lines: usize = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| read_string(entry.unwrap().path()).lines().count())
        .sum();
    assert_eq!(total_lines, 201);
    assert_eq!(sink.metrics().rotations, 1);
    assert_eq!(sink.metrics().records_written, 201);
}
