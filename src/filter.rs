//! Picking one adapter out of an enumerated list.
//!
//! Adapters are usually named ad hoc on a command line or in a config line,
//! so every field is matched as text: VID/PID in any common notation,
//! serial and description case-insensitively.

use crate::device::DeviceDescriptor;
use crate::error::{self, Error, Result};
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;

/// Which adapter to open. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenFilter {
    pub index: Option<String>,
    pub vid: Option<String>,
    pub pid: Option<String>,
    pub serial: Option<String>,
    pub description: Option<String>,
}

impl OpenFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn vid(mut self, vid: impl Into<String>) -> Self {
        self.vid = Some(vid.into());
        self
    }

    pub fn pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.index.is_none()
            && self.vid.is_none()
            && self.pid.is_none()
            && self.serial.is_none()
            && self.description.is_none()
    }

    /// True if every present field matches `device`.
    pub fn matches(&self, device: &DeviceDescriptor) -> bool {
        field_matches(&self.index, |s| s == device.index().to_string())
            && field_matches(&self.vid, |s| matches_u16(s, device.vid()))
            && field_matches(&self.pid, |s| matches_u16(s, device.pid()))
            && field_matches(&self.serial, |s| s.eq_ignore_ascii_case(device.serial()))
            && field_matches(&self.description, |s| {
                s.eq_ignore_ascii_case(device.description())
            })
    }
}

fn field_matches(want: &Option<String>, test: impl Fn(&str) -> bool) -> bool {
    want.as_deref().map_or(true, test)
}

/// Case-insensitive comparison against every accepted notation of `value`:
/// bare hex, `0x` hex, 4-digit hex, 4-digit `0x` hex and decimal.
fn matches_u16(text: &str, value: u16) -> bool {
    let text = text.trim();
    [
        format!("{value:x}"),
        format!("0x{value:x}"),
        format!("{value:04x}"),
        format!("0x{value:04x}"),
        format!("{value}"),
    ]
    .iter()
    .any(|form| form.eq_ignore_ascii_case(text))
}

impl fmt::Display for OpenFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        let fields = [
            ("index", &self.index),
            ("vid", &self.vid),
            ("pid", &self.pid),
            ("serial", &self.serial),
            ("description", &self.description),
        ];
        let mut first = true;
        write!(f, "{{")?;
        for (key, value) in fields {
            if let Some(value) = value {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value:?}")?;
                first = false;
            }
        }
        write!(f, "}}")
    }
}

impl FromStr for OpenFilter {
    type Err = Error;

    /// Parses `key=value[,key=value...]`.
    ///
    /// Keys: `index`, `vid`, `pid`, `serial`, `description` (or `desc`).
    /// An empty string is the empty filter.
    fn from_str(s: &str) -> Result<Self> {
        let mut filter = OpenFilter::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                error::invalid_parameter("filter", format!("expected key=value, got '{pair}'"))
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "index" => filter.index = Some(value),
                "vid" => filter.vid = Some(value),
                "pid" => filter.pid = Some(value),
                "serial" => filter.serial = Some(value),
                "description" | "desc" => filter.description = Some(value),
                other => {
                    return Err(error::invalid_parameter(
                        "filter",
                        format!(
                            "unknown key '{other}' (valid: index, vid, pid, serial, description)"
                        ),
                    ))
                }
            }
        }
        Ok(filter)
    }
}

/// Returns the position in `devices` of the first entry matching `filter`.
///
/// Without a filter the first entry is selected. Fails with
/// [`Error::DeviceNotFound`] when nothing matches, including when `devices`
/// is empty.
pub fn select(devices: &[DeviceDescriptor], filter: Option<&OpenFilter>) -> Result<usize> {
    let position = match filter {
        None => (!devices.is_empty()).then_some(0),
        Some(filter) => devices.iter().position(|device| {
            let hit = filter.matches(device);
            trace!("Filter {} vs {}: {}", filter, device, hit);
            hit
        }),
    };
    match position {
        Some(position) => {
            debug!("Selected device {}", devices[position]);
            Ok(position)
        }
        None => Err(Error::DeviceNotFound {
            filter: filter.map_or_else(|| "{}".to_string(), ToString::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RawDeviceInfo;

    fn device(index: usize, vid: u16, pid: u16, serial: &str, desc: &str) -> DeviceDescriptor {
        let raw = RawDeviceInfo::new(0x02, 8, vid, pid, 0x10 + index as u32, serial, desc);
        DeviceDescriptor::from_raw(index, &raw).unwrap()
    }

    fn two_devices() -> Vec<DeviceDescriptor> {
        vec![
            device(0, 0x0403, 0x6014, "FT9XK1AB", "FT232H"),
            device(1, 0x0403, 0x6010, "FTQ77C2", "FT232H-C"),
        ]
    }

    #[test]
    fn test_vid_pid_notations() {
        let d = device(0, 0x0403, 0x6014, "S", "D");
        for vid in ["403", "0x403", "0403", "0x0403", "1027", "0X0403", " 0403 "] {
            assert!(OpenFilter::new().vid(vid).matches(&d), "vid {vid:?}");
        }
        for pid in ["6014", "0x6014", "24596", "0X6014"] {
            assert!(OpenFilter::new().pid(pid).matches(&d), "pid {pid:?}");
        }
        let d = device(0, 0x00AB, 0xBEEF, "S", "D");
        for pid in ["beef", "BEEF", "0xBeEf", "48879"] {
            assert!(OpenFilter::new().pid(pid).matches(&d), "pid {pid:?}");
        }
        for vid in ["ab", "0xab", "00ab", "0x00AB", "171"] {
            assert!(OpenFilter::new().vid(vid).matches(&d), "vid {vid:?}");
        }
        assert!(!OpenFilter::new().vid("0x0404").matches(&d));
        assert!(!OpenFilter::new().vid("").matches(&d));
    }

    #[test]
    fn test_string_fields_case_insensitive_exact() {
        let d = device(0, 0x0403, 0x6014, "FT9XK1AB", "FT232H");
        assert!(OpenFilter::new().serial("ft9xk1ab").matches(&d));
        assert!(OpenFilter::new().description("ft232h").matches(&d));
        assert!(!OpenFilter::new().description("FT232").matches(&d));
        assert!(!OpenFilter::new().serial("FT9XK1ABC").matches(&d));
    }

    #[test]
    fn test_index_exact_decimal() {
        let devices = two_devices();
        assert_eq!(select(&devices, Some(&OpenFilter::new().index("1"))).unwrap(), 1);
        assert!(select(&devices, Some(&OpenFilter::new().index("01"))).is_err());
        assert!(select(&devices, Some(&OpenFilter::new().index("2"))).is_err());
    }

    #[test]
    fn test_select_first_match_wins() {
        let devices = two_devices();
        let by_desc = OpenFilter::new().description("FT232H");
        assert_eq!(select(&devices, Some(&by_desc)).unwrap(), 0);
        let by_vid = OpenFilter::new().vid("0403");
        assert_eq!(select(&devices, Some(&by_vid)).unwrap(), 0);
        let combined = OpenFilter::new().vid("0x403").pid("6010");
        assert_eq!(select(&devices, Some(&combined)).unwrap(), 1);
        let conflicting = OpenFilter::new().pid("6010").description("FT232H");
        assert!(matches!(
            select(&devices, Some(&conflicting)),
            Err(Error::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn test_select_without_filter() {
        let devices = two_devices();
        assert_eq!(select(&devices, None).unwrap(), 0);
        assert_eq!(select(&devices, Some(&OpenFilter::new())).unwrap(), 0);
        assert!(matches!(select(&[], None), Err(Error::DeviceNotFound { .. })));
        assert!(matches!(
            select(&[], Some(&OpenFilter::new())),
            Err(Error::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn test_parse_filter() {
        let f: OpenFilter = "vid=0403, PID=0x6014,desc=FT232H".parse().unwrap();
        assert_eq!(f.vid.as_deref(), Some("0403"));
        assert_eq!(f.pid.as_deref(), Some("0x6014"));
        assert_eq!(f.description.as_deref(), Some("FT232H"));
        assert!(f.serial.is_none());

        assert!("".parse::<OpenFilter>().unwrap().is_empty());
        assert!("bogus=1".parse::<OpenFilter>().is_err());
        assert!("vid".parse::<OpenFilter>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OpenFilter::new().to_string(), "{}");
        assert_eq!(
            OpenFilter::new().vid("0403").serial("X").to_string(),
            "{vid: \"0403\", serial: \"X\"}"
        );
    }
}
