/*
 * This file is part of pamfingerprint.
 *
 * Copyright (C) 2025 pamfingerprint contributors
 *
 * pamfingerprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pamfingerprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pamfingerprint. If not, see <https://www.gnu.org/licenses/>.
 */

//! Authentication decision procedure
//!
//! One attempt runs through these steps, stopping at the first failure:
//!
//! | Step | Failure | Outcome |
//! |------|---------|---------|
//! | resolve identity | no user | `UserUnknown` |
//! | load configuration | unreadable / invalid | `Ignore` |
//! | look up user | not configured | `Ignore` |
//! | parse record | not `position,hash` | `AuthError` |
//! | open sensor, verify password | any | `Ignore` + notice |
//! | capture, search, compare | any | `AuthError` + notice |
//!
//! `Ignore` lets the rest of the PAM stack decide; `AuthError` is a denial.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pf_error::FingerprintError;
use pf_sensor::{CharBuffer, FingerprintSensor, Sensor};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{timeout_from_secs, Config, SensorConfig, UserRecord};
use crate::constants::{notice, notices};
use crate::digest::{characteristics_hash, hashes_match};
use crate::scan::wait_for_finger;
use crate::session::{resolve_identity, Session};

/// Result of one attempt, as reported to PAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    AuthError,
    UserUnknown,
    Ignore,
}

impl Outcome {
    /// Linux-PAM return code
    pub fn code(self) -> libc::c_int {
        match self {
            Outcome::Success => crate::pam::PAM_SUCCESS,
            Outcome::AuthError => crate::pam::PAM_AUTH_ERR,
            Outcome::UserUnknown => crate::pam::PAM_USER_UNKNOWN,
            Outcome::Ignore => crate::pam::PAM_IGNORE,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::AuthError => write!(f, "authentication error"),
            Outcome::UserUnknown => write!(f, "user unknown"),
            Outcome::Ignore => write!(f, "ignore"),
        }
    }
}

/// Why an attempt did not succeed, one kind per step
#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("user resolution failed: {0}")]
    UserResolution(#[source] FingerprintError),

    #[error("configuration could not be loaded: {0}")]
    ConfigLoad(#[source] FingerprintError),

    #[error("the user \"{0}\" was not added")]
    UnknownUser(String),

    #[error("{0}")]
    MalformedRecord(#[source] FingerprintError),

    #[error("the fingerprint sensor could not be initialized: {0}")]
    DeviceInit(#[source] FingerprintError),

    #[error("fingerprint read failed: {0}")]
    ScanOrMatch(#[source] FingerprintError),
}

impl Failure {
    pub fn outcome(&self) -> Outcome {
        match self {
            Failure::UserResolution(_) => Outcome::UserUnknown,
            Failure::ConfigLoad(_) | Failure::UnknownUser(_) | Failure::DeviceInit(_) => Outcome::Ignore,
            Failure::MalformedRecord(_) | Failure::ScanOrMatch(_) => Outcome::AuthError,
        }
    }

    /// Notice shown to the user, if this failure warrants one
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Failure::DeviceInit(_) => Some(notices::SENSOR_INIT_FAILED),
            Failure::ScanOrMatch(_) => Some(notices::ACCESS_DENIED),
            _ => None,
        }
    }

    /// A finger that simply belongs to someone else is not a malfunction
    fn is_warning(&self) -> bool {
        matches!(self, Failure::ScanOrMatch(FingerprintError::HashMismatch))
    }
}

/// Record of one attempt
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub user: Option<String>,
    pub service: Option<String>,
    pub outcome: Outcome,
    pub reason: Option<String>,
}

/// Creates the sensor connection for an attempt
pub trait SensorConnector {
    fn connect(&self, config: &SensorConfig) -> pf_error::Result<Box<dyn FingerprintSensor>>;
}

/// Connects to real hardware over the configured serial port
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl SensorConnector for SerialConnector {
    fn connect(&self, config: &SensorConfig) -> pf_error::Result<Box<dyn FingerprintSensor>> {
        let sensor = Sensor::open(&config.port, config.baud_rate, config.address, config.password)?;
        Ok(Box::new(sensor))
    }
}

impl<F> SensorConnector for F
where
    F: Fn(&SensorConfig) -> pf_error::Result<Box<dyn FingerprintSensor>>,
{
    fn connect(&self, config: &SensorConfig) -> pf_error::Result<Box<dyn FingerprintSensor>> {
        self(config)
    }
}

/// Connect and verify the password
pub fn open_sensor<C: SensorConnector + ?Sized>(
    connector: &C,
    config: &SensorConfig,
) -> pf_error::Result<Box<dyn FingerprintSensor>> {
    let mut sensor = connector.connect(config)?;
    if !sensor.verify_password()? {
        return Err(FingerprintError::WrongPassword);
    }
    Ok(sensor)
}

/// Capture a finger and check it against `record`
///
/// The match must sit at the recorded position and its characteristics must
/// hash to the recorded digest. A match anywhere else counts as no match.
pub fn verify_finger(
    sensor: &mut dyn FingerprintSensor,
    record: &UserRecord,
    timeout: Option<Duration>,
) -> pf_error::Result<()> {
    wait_for_finger(sensor, timeout)?;
    sensor.convert_image(CharBuffer::One)?;

    let result = sensor.search_template()?;
    let position = result.matched().ok_or(FingerprintError::NoMatch)?;
    if i32::from(position) != record.position {
        return Err(FingerprintError::PositionMismatch {
            expected: record.position,
            found: result.position,
        });
    }
    debug!(position, accuracy = result.accuracy, "Found matching template");

    sensor.load_template(position, CharBuffer::One)?;
    let characteristics = sensor.download_characteristics(CharBuffer::One)?;
    let hash = characteristics_hash(&characteristics);

    if !hashes_match(&hash, &record.hash) {
        return Err(FingerprintError::HashMismatch);
    }
    Ok(())
}

/// Runs the decision procedure against a configuration file
#[derive(Debug, Clone)]
pub struct Authenticator<C = SerialConnector> {
    config_path: PathBuf,
    connector: C,
    timeout_secs: Option<u64>,
    quiet: bool,
}

impl Authenticator<SerialConnector> {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self::with_connector(config_path, SerialConnector)
    }
}

impl<C: SensorConnector> Authenticator<C> {
    pub fn with_connector(config_path: impl Into<PathBuf>, connector: C) -> Self {
        Self {
            config_path: config_path.into(),
            connector,
            timeout_secs: None,
            quiet: false,
        }
    }

    /// Override the configured capture timeout; `Some(0)` waits forever
    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Do not send notices to the user
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Run one attempt and report its outcome
    pub fn authenticate<S: Session + ?Sized>(&self, session: &mut S) -> Report {
        let service = session.service();
        let user = match resolve_identity(session) {
            Ok(user) => user,
            Err(e) => {
                return self.finish(session, None, service, Err(Failure::UserResolution(e)));
            }
        };

        let result = self.run(session, &user, service.as_deref());
        self.finish(session, Some(user), service, result)
    }

    fn run<S: Session + ?Sized>(&self, session: &mut S, user: &str, service: Option<&str>) -> Result<(), Failure> {
        let config = Config::load(&self.config_path).map_err(Failure::ConfigLoad)?;

        info!(
            "The user \"{}\" is asking for permission for service \"{}\"",
            user,
            service.unwrap_or("unknown")
        );

        if !config.has_user(user) {
            return Err(Failure::UnknownUser(user.to_string()));
        }
        let record = config.user_record(user).map_err(Failure::MalformedRecord)?;

        let sensor_config = config.sensor().map_err(Failure::DeviceInit)?;
        let mut sensor = open_sensor(&self.connector, &sensor_config).map_err(Failure::DeviceInit)?;

        self.send_notice(session, notices::WAITING_FOR_FINGER);

        let timeout = match self.timeout_secs {
            Some(secs) => timeout_from_secs(secs),
            None => sensor_config.timeout,
        };
        verify_finger(sensor.as_mut(), &record, timeout).map_err(Failure::ScanOrMatch)
    }

    fn finish<S: Session + ?Sized>(
        &self,
        session: &mut S,
        user: Option<String>,
        service: Option<String>,
        result: Result<(), Failure>,
    ) -> Report {
        match result {
            Ok(()) => {
                info!(user = user.as_deref().unwrap_or_default(), "Access granted");
                self.send_notice(session, notices::ACCESS_GRANTED);
                Report {
                    user,
                    service,
                    outcome: Outcome::Success,
                    reason: None,
                }
            }
            Err(failure) => {
                let outcome = failure.outcome();
                let who = user.as_deref().unwrap_or_default();
                if failure.is_warning() {
                    warn!(user = who, %outcome, "{}", failure);
                } else if let Failure::ScanOrMatch(e) = &failure {
                    if e.is_transport() {
                        error!(user = who, %outcome, "Communication with the sensor failed: {}", failure);
                    } else {
                        error!(user = who, %outcome, "{}", failure);
                    }
                } else {
                    error!(user = who, %outcome, "{}", failure);
                }

                if let Some(text) = failure.notice() {
                    self.send_notice(session, text);
                }
                Report {
                    user,
                    service,
                    outcome,
                    reason: Some(failure.to_string()),
                }
            }
        }
    }

    /// Notices are best effort; delivery problems never change the outcome
    fn send_notice<S: Session + ?Sized>(&self, session: &mut S, text: &str) {
        if self.quiet {
            return;
        }
        if let Err(e) = session.notify(&notice(text)) {
            debug!("Could not deliver notice: {}", e);
        }
    }
}

/// Credential alteration has nothing to do for a fingerprint
pub fn set_credentials() -> Outcome {
    Outcome::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{
        connector_for, failing_connector, write_config, MockSensor, RecordingSession, TEST_CHARACTERISTICS,
    };
    use pf_sensor::SearchResult;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct LevelCapture(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for LevelCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    /// Run one attempt for alice, returning its outcome and every level logged
    fn logged_levels<C: SensorConnector>(auth: &Authenticator<C>) -> (Outcome, Vec<Level>) {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LevelCapture(levels.clone()));
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = tracing::subscriber::with_default(subscriber, || auth.authenticate(&mut session));

        let levels = levels.lock().unwrap().clone();
        (report.outcome, levels)
    }

    fn matching_sensor(position: i32, characteristics: Vec<u8>) -> MockSensor {
        let mut sensor = MockSensor::new();
        sensor.expect_verify_password().returning(|| Ok(true));
        sensor.expect_read_image().returning(|| Ok(true));
        sensor.expect_convert_image().returning(|_| Ok(()));
        sensor
            .expect_search_template()
            .returning(move || Ok(SearchResult { position, accuracy: 90 }));
        sensor.expect_load_template().returning(|_, _| Ok(()));
        sensor
            .expect_download_characteristics()
            .returning(move |_| Ok(characteristics.clone()));
        sensor
    }

    fn stored_hash() -> String {
        characteristics_hash(&TEST_CHARACTERISTICS)
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(Outcome::Success.code(), 0);
        assert_eq!(Outcome::AuthError.code(), 7);
        assert_eq!(Outcome::UserUnknown.code(), 10);
        assert_eq!(Outcome::Ignore.code(), 25);
    }

    #[test]
    fn test_set_credentials_always_succeeds() {
        assert_eq!(set_credentials(), Outcome::Success);
    }

    #[test]
    fn test_success() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(4, TEST_CHARACTERISTICS.to_vec())));

        let mut session = RecordingSession::new(None, Some("alice"));
        let report = auth.authenticate(&mut session);

        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.user.as_deref(), Some("alice"));
        assert_eq!(
            session.notices,
            vec![notice(notices::WAITING_FOR_FINGER), notice(notices::ACCESS_GRANTED)]
        );
    }

    #[test]
    fn test_user_unknown() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[]);
        let auth = Authenticator::with_connector(&path, failing_connector());
        let mut session = RecordingSession::new(None, None);
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::UserUnknown);
        assert!(session.notices.is_empty());
    }

    #[test]
    fn test_empty_target_user_ignores() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, failing_connector());
        let mut session = RecordingSession::new(None, Some(""));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::Ignore);
        assert_eq!(report.user.as_deref(), Some(""));
        assert!(session.notices.is_empty());
    }

    #[test]
    fn test_missing_config_ignores() {
        let dir = TempDir::new().unwrap();
        let auth = Authenticator::with_connector(dir.path().join("missing.conf"), failing_connector());
        let mut session = RecordingSession::new(None, Some("alice"));
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::Ignore);
    }

    #[test]
    fn test_unconfigured_user_ignores() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("bob", format!("1,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, failing_connector());
        let mut session = RecordingSession::new(None, Some("alice"));
        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::Ignore);
        assert!(session.notices.is_empty());
    }

    #[test]
    fn test_malformed_record_denies() {
        let dir = TempDir::new().unwrap();
        for raw in ["4", "four,abc", "4,abc,def"] {
            let path = write_config(&dir, &[("alice", raw.to_string())]);
            let auth = Authenticator::with_connector(&path, failing_connector());
            let mut session = RecordingSession::new(None, Some("alice"));
            assert_eq!(auth.authenticate(&mut session).outcome, Outcome::AuthError, "record {:?}", raw);
        }
    }

    #[test]
    fn test_device_init_failure_ignores_with_notice() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, failing_connector());
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::Ignore);
        assert_eq!(session.notices, vec![notice(notices::SENSOR_INIT_FAILED)]);
    }

    #[test]
    fn test_wrong_sensor_password_ignores() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let mut sensor = MockSensor::new();
        sensor.expect_verify_password().returning(|| Ok(false));
        let auth = Authenticator::with_connector(&path, connector_for(sensor));
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::Ignore);
        assert!(report.reason.unwrap().contains("password"));
    }

    #[test]
    fn test_notice_failure_does_not_abort() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, failing_connector());
        let mut session = RecordingSession::new(None, Some("alice"));
        session.fail_notify = true;
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::Ignore);
    }

    #[test]
    fn test_no_match_denies() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(-1, Vec::new())));
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::AuthError);
        assert_eq!(session.notices.last(), Some(&notice(notices::ACCESS_DENIED)));
    }

    #[test]
    fn test_wrong_position_denies_even_with_matching_hash() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(5, TEST_CHARACTERISTICS.to_vec())));
        let mut session = RecordingSession::new(None, Some("alice"));
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::AuthError);
    }

    #[test]
    fn test_hash_one_character_off_denies() {
        let dir = TempDir::new().unwrap();
        let mut hash = stored_hash();
        let last = hash.pop().unwrap();
        hash.push(if last == '0' { '1' } else { '0' });
        let path = write_config(&dir, &[("alice", format!("4,{}", hash))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(4, TEST_CHARACTERISTICS.to_vec())));
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::AuthError);
        assert_eq!(session.notices.last(), Some(&notice(notices::ACCESS_DENIED)));
    }

    #[test]
    fn test_uppercase_stored_hash_denies() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash().to_uppercase()))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(4, TEST_CHARACTERISTICS.to_vec())));
        let mut session = RecordingSession::new(None, Some("alice"));
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::AuthError);
    }

    #[test]
    fn test_sensor_error_during_scan_denies() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let mut sensor = MockSensor::new();
        sensor.expect_verify_password().returning(|| Ok(true));
        sensor.expect_read_image().returning(|| Ok(true));
        sensor
            .expect_convert_image()
            .returning(|_| Err(FingerprintError::sensor(0x06, "the image is too messy")));
        let auth = Authenticator::with_connector(&path, connector_for(sensor));
        let mut session = RecordingSession::new(None, Some("alice"));

        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::AuthError);
        assert_eq!(session.notices.last(), Some(&notice(notices::ACCESS_DENIED)));
    }

    #[test]
    fn test_capture_timeout_denies() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let mut sensor = MockSensor::new();
        sensor.expect_verify_password().returning(|| Ok(true));
        sensor.expect_read_image().returning(|| Ok(false));
        let auth = Authenticator::with_connector(&path, connector_for(sensor)).timeout_secs(Some(1));
        let mut session = RecordingSession::new(None, Some("alice"));

        let report = auth.authenticate(&mut session);
        assert_eq!(report.outcome, Outcome::AuthError);
        assert!(report.reason.unwrap().contains("timed out"));
    }

    #[test]
    fn test_quiet_sends_no_notices() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, failing_connector()).quiet(true);
        let mut session = RecordingSession::new(None, Some("alice"));
        assert_eq!(auth.authenticate(&mut session).outcome, Outcome::Ignore);
        assert!(session.notices.is_empty());
    }

    #[test]
    fn test_failure_outcomes() {
        assert_eq!(Failure::UserResolution("x".into()).outcome(), Outcome::UserUnknown);
        assert_eq!(Failure::ConfigLoad("x".into()).outcome(), Outcome::Ignore);
        assert_eq!(Failure::UnknownUser("alice".into()).outcome(), Outcome::Ignore);
        assert_eq!(Failure::MalformedRecord("x".into()).outcome(), Outcome::AuthError);
        assert_eq!(Failure::DeviceInit("x".into()).outcome(), Outcome::Ignore);
        assert_eq!(Failure::ScanOrMatch(FingerprintError::NoMatch).outcome(), Outcome::AuthError);
        assert!(Failure::ScanOrMatch(FingerprintError::HashMismatch).is_warning());
        assert!(!Failure::ScanOrMatch(FingerprintError::NoMatch).is_warning());
    }

    #[test]
    fn test_granted_attempt_logs_info() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(4, TEST_CHARACTERISTICS.to_vec())));

        let (outcome, levels) = logged_levels(&auth);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(levels.last(), Some(&Level::INFO));
        assert!(!levels.iter().any(|l| *l == Level::WARN || *l == Level::ERROR), "{:?}", levels);
    }

    #[test]
    fn test_hash_mismatch_logs_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", "0".repeat(64)))]);
        let auth = Authenticator::with_connector(&path, connector_for(matching_sensor(4, TEST_CHARACTERISTICS.to_vec())));

        let (outcome, levels) = logged_levels(&auth);
        assert_eq!(outcome, Outcome::AuthError);
        assert_eq!(levels.last(), Some(&Level::WARN));
        assert!(!levels.contains(&Level::ERROR), "{:?}", levels);
    }

    #[test]
    fn test_failures_log_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &[("alice", format!("4,{}", stored_hash()))]);

        let device_init = Authenticator::with_connector(&path, failing_connector());
        let no_match = Authenticator::with_connector(&path, connector_for(matching_sensor(-1, Vec::new())));
        let missing_config = Authenticator::with_connector(dir.path().join("missing.conf"), failing_connector());

        let (outcome, levels) = logged_levels(&device_init);
        assert_eq!(outcome, Outcome::Ignore);
        assert_eq!(levels.last(), Some(&Level::ERROR));

        let (outcome, levels) = logged_levels(&no_match);
        assert_eq!(outcome, Outcome::AuthError);
        assert_eq!(levels.last(), Some(&Level::ERROR));

        let (outcome, levels) = logged_levels(&missing_config);
        assert_eq!(outcome, Outcome::Ignore);
        assert_eq!(levels.last(), Some(&Level::ERROR));
    }
}
