//! SQL schema for the Praxis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The uniqueness constraints are load-bearing: (learner, lesson) on
/// progress and history rows makes the upserts conditional, and the two
/// UNIQUE constraints on certificates arbitrate issuance races.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS courses (
    course_id     TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    instructor_id TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    lesson_id  TEXT PRIMARY KEY,
    course_id  TEXT NOT NULL REFERENCES courses(course_id),
    title      TEXT NOT NULL,
    is_free    INTEGER NOT NULL DEFAULT 0,
    sequence   INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id    TEXT PRIMARY KEY,
    learner_id       TEXT NOT NULL,
    course_id        TEXT NOT NULL REFERENCES courses(course_id),
    progress_percent INTEGER NOT NULL DEFAULT 0,
    status           TEXT NOT NULL DEFAULT 'active',
    enrolled_at      TEXT NOT NULL,
    UNIQUE (learner_id, course_id)
);

-- One row per (learner, lesson); the enrollment column follows the most
-- recent writer. All mutation goes through ON CONFLICT upserts.
CREATE TABLE IF NOT EXISTS lesson_progress (
    learner_id         TEXT NOT NULL,
    course_id          TEXT NOT NULL,
    lesson_id          TEXT NOT NULL REFERENCES lessons(lesson_id),
    enrollment_id      TEXT NOT NULL REFERENCES enrollments(enrollment_id),
    is_completed       INTEGER NOT NULL DEFAULT 0,
    completed_at       TEXT,
    video_position     REAL NOT NULL DEFAULT 0,
    video_duration     REAL NOT NULL DEFAULT 0,
    watched_percentage INTEGER NOT NULL DEFAULT 0,
    video_updated_at   TEXT,
    quiz_score         INTEGER,
    quiz_passed        INTEGER NOT NULL DEFAULT 0,
    quiz_attempts      INTEGER NOT NULL DEFAULT 0,
    time_spent_seconds INTEGER NOT NULL DEFAULT 0,
    last_accessed_at   TEXT,
    PRIMARY KEY (learner_id, lesson_id)
);

-- Global resume record, keyed by (learner, lesson) so it survives
-- re-enrollment.
CREATE TABLE IF NOT EXISTS video_history (
    learner_id        TEXT NOT NULL,
    lesson_id         TEXT NOT NULL REFERENCES lessons(lesson_id),
    course_id         TEXT NOT NULL,
    position_seconds  REAL NOT NULL DEFAULT 0,
    duration_seconds  REAL NOT NULL DEFAULT 0,
    last_watched_at   TEXT NOT NULL,
    is_completed      INTEGER NOT NULL DEFAULT 0,
    quality           TEXT NOT NULL DEFAULT '720p',
    subtitles_enabled INTEGER NOT NULL DEFAULT 0,
    watch_rate        REAL NOT NULL DEFAULT 1,
    PRIMARY KEY (learner_id, lesson_id)
);

CREATE TABLE IF NOT EXISTS certificates (
    certificate_id        TEXT PRIMARY KEY,
    certificate_reference TEXT NOT NULL UNIQUE,
    learner_id            TEXT NOT NULL,
    course_id             TEXT NOT NULL,
    enrollment_id         TEXT NOT NULL REFERENCES enrollments(enrollment_id),
    student_name          TEXT NOT NULL,
    course_name           TEXT NOT NULL,
    completion_date       TEXT NOT NULL,
    issued_at             TEXT NOT NULL,
    is_approved           INTEGER NOT NULL DEFAULT 0,
    completion_hash       TEXT,
    blockchain_tx_id      TEXT,
    UNIQUE (learner_id, course_id)
);

CREATE INDEX IF NOT EXISTS lessons_course_idx
    ON lessons(course_id, sequence);
CREATE INDEX IF NOT EXISTS progress_course_idx
    ON lesson_progress(learner_id, course_id);
CREATE INDEX IF NOT EXISTS progress_enrollment_idx
    ON lesson_progress(enrollment_id);
CREATE INDEX IF NOT EXISTS history_resume_idx
    ON video_history(learner_id, course_id, last_watched_at);

PRAGMA user_version = 1;
";
