/*
 * Test utilities and mock helpers for pamfingerprint
 *
 * Sensor doubles, a recording session and configuration fixtures shared by
 * the unit test modules.
 */

#[cfg(test)]
pub mod test_utils {
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;

    use mockall::mock;
    use pf_error::{FingerprintError, Result};
    use pf_sensor::{CharBuffer, FingerprintSensor, SearchResult, SystemParameters};
    use tempfile::TempDir;

    use crate::config::SensorConfig;
    use crate::session::Session;

    mock! {
        pub Sensor {}

        impl FingerprintSensor for Sensor {
            fn verify_password(&mut self) -> Result<bool>;
            fn read_image(&mut self) -> Result<bool>;
            fn convert_image(&mut self, buffer: CharBuffer) -> Result<()>;
            fn search_template(&mut self) -> Result<SearchResult>;
            fn load_template(&mut self, position: u16, buffer: CharBuffer) -> Result<()>;
            fn download_characteristics(&mut self, buffer: CharBuffer) -> Result<Vec<u8>>;
            fn system_parameters(&mut self) -> Result<SystemParameters>;
            fn template_count(&mut self) -> Result<u16>;
            fn template_index(&mut self, page: u8) -> Result<Vec<bool>>;
            fn create_template(&mut self) -> Result<bool>;
            fn store_template(&mut self, position: Option<u16>, buffer: CharBuffer) -> Result<u16>;
            fn delete_template(&mut self, position: u16) -> Result<bool>;
            fn compare_characteristics(&mut self) -> Result<u16>;
        }
    }

    /// Characteristics downloaded by the sensor doubles
    pub const TEST_CHARACTERISTICS: [u8; 8] = [3, 1, 87, 0, 255, 16, 42, 9];

    /// Session that records the notices it is sent
    #[derive(Debug, Default)]
    pub struct RecordingSession {
        pub ruser: Option<String>,
        pub user: Option<String>,
        pub service: Option<String>,
        pub notices: Vec<String>,
        pub fail_user_lookup: bool,
        pub fail_notify: bool,
    }

    impl RecordingSession {
        pub fn new(ruser: Option<&str>, user: Option<&str>) -> Self {
            Self {
                ruser: ruser.map(str::to_string),
                user: user.map(str::to_string),
                service: Some("login".to_string()),
                ..Default::default()
            }
        }
    }

    impl Session for RecordingSession {
        fn requesting_user(&mut self) -> Result<Option<String>> {
            if self.fail_user_lookup {
                return Err(FingerprintError::Pam {
                    call: "pam_get_item".to_string(),
                    code: 29,
                });
            }
            Ok(self.ruser.clone())
        }

        fn target_user(&mut self) -> Result<Option<String>> {
            Ok(self.user.clone())
        }

        fn service(&mut self) -> Option<String> {
            self.service.clone()
        }

        fn notify(&mut self, message: &str) -> Result<()> {
            if self.fail_notify {
                return Err(FingerprintError::Pam {
                    call: "conversation".to_string(),
                    code: 19,
                });
            }
            self.notices.push(message.to_string());
            Ok(())
        }
    }

    /// Connector handing out `sensor` on the first connect
    pub fn connector_for(
        sensor: MockSensor,
    ) -> impl Fn(&SensorConfig) -> Result<Box<dyn FingerprintSensor>> {
        let slot = RefCell::new(Some(sensor));
        move |_: &SensorConfig| -> Result<Box<dyn FingerprintSensor>> {
            match slot.borrow_mut().take() {
                Some(sensor) => Ok(Box::new(sensor)),
                None => Err(FingerprintError::generic("sensor already taken")),
            }
        }
    }

    /// Connector that behaves like an unplugged sensor
    pub fn failing_connector() -> impl Fn(&SensorConfig) -> Result<Box<dyn FingerprintSensor>> {
        |config: &SensorConfig| -> Result<Box<dyn FingerprintSensor>> {
            Err(FingerprintError::SerialOpen {
                port: config.port.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    /// Write a configuration with the given `[Users]` entries and a valid sensor section
    pub fn write_config(dir: &TempDir, users: &[(&str, String)]) -> PathBuf {
        let mut body = String::from("[Users]\n");
        for (user, raw) in users {
            body.push_str(&format!("{} = {}\n", user, raw));
        }
        body.push_str(
            "\n[PyFingerprint]\nport = /dev/ttyUSB0\nbaudRate = 57600\naddress = 0xFFFFFFFF\npassword = 0x00000000\n",
        );

        let path = dir.path().join("pamfingerprint.conf");
        fs::write(&path, body).unwrap();
        path
    }
}
