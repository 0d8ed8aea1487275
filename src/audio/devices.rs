//! Audio device lookup shared by playback, capture and `list-devices`.

use cpal::traits::{DeviceTrait, HostTrait};
use std::sync::Mutex;

use super::error::AudioError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Which side of the sound card a device is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// How a device is selected in the config: "default", an index, or a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSpec<'a> {
    Default,
    Index(usize),
    Name(&'a str),
}

impl<'a> DeviceSpec<'a> {
    pub fn parse(spec: &'a str) -> Self {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("default") {
            Self::Default
        } else if let Ok(index) = spec.parse::<usize>() {
            Self::Index(index)
        } else {
            Self::Name(spec)
        }
    }
}

/// Lists the devices of one direction, skipping any whose name cannot be read.
pub fn list_devices(host: &cpal::Host, direction: Direction) -> Result<Vec<cpal::Device>, AudioError> {
    let devices = match direction {
        Direction::Input => host.input_devices().map(|d| d.collect::<Vec<_>>()),
        Direction::Output => host.output_devices().map(|d| d.collect::<Vec<_>>()),
    }
    .map_err(|e| AudioError::DeviceAbsent(format!("Failed to enumerate devices: {e}")))?;

    Ok(devices.into_iter().filter(|d| d.name().is_ok()).collect())
}

/// Resolves a configured device spec to a device.
///
/// # Errors
/// - [`AudioError::DeviceAbsent`] when nothing matches
pub fn find_device(host: &cpal::Host, direction: Direction, spec: &str) -> Result<cpal::Device, AudioError> {
    match DeviceSpec::parse(spec) {
        DeviceSpec::Default => match direction {
            Direction::Input => host.default_input_device(),
            Direction::Output => host.default_output_device(),
        }
        .ok_or_else(|| {
            AudioError::DeviceAbsent(format!("No audio {} device available", direction.label()))
        }),
        DeviceSpec::Index(index) => {
            let devices = list_devices(host, direction)?;
            let count = devices.len();
            devices.into_iter().nth(index).ok_or_else(|| {
                AudioError::DeviceAbsent(format!(
                    "Device index {} is out of range (0-{})",
                    index,
                    count.saturating_sub(1)
                ))
            })
        }
        DeviceSpec::Name(name) => list_devices(host, direction)?
            .into_iter()
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| {
                AudioError::DeviceAbsent(format!(
                    "Audio {} device '{name}' not found. Use 'mahir list-devices' to see available devices.",
                    direction.label()
                ))
            }),
    }
}

/// Serializes stderr redirection; concurrent tone threads would otherwise
/// restore each other's redirected descriptor.
static STDERR_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with stderr pointed at /dev/null to hide ALSA library chatter.
#[cfg(target_os = "linux")]
pub fn quiet_alsa<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let _guard = STDERR_LOCK.lock().unwrap_or_else(|p| p.into_inner());

    let Ok(dev_null) = OpenOptions::new().write(true).open("/dev/null") else {
        return f();
    };

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// ALSA only exists on Linux; elsewhere this just runs `f`.
#[cfg(not(target_os = "linux"))]
pub fn quiet_alsa<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let _guard = STDERR_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_spec_parsing() {
        assert_eq!(DeviceSpec::parse("default"), DeviceSpec::Default);
        assert_eq!(DeviceSpec::parse("DEFAULT"), DeviceSpec::Default);
        assert_eq!(DeviceSpec::parse(""), DeviceSpec::Default);
        assert_eq!(DeviceSpec::parse("2"), DeviceSpec::Index(2));
        assert_eq!(DeviceSpec::parse(" USB Mic "), DeviceSpec::Name("USB Mic"));
    }

    #[test]
    fn test_quiet_alsa_returns_closure_value() {
        assert_eq!(quiet_alsa(|| 42), 42);
        let joined = quiet_alsa(|| ["do", "re"].join("-"));
        assert_eq!(joined, "do-re");
    }
}
