//! Lists the audio devices mahir can play tones on and record from.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::audio::devices::{list_devices, quiet_alsa, Direction};

/// Prints output and input devices with their index, name and default config.
///
/// The index or name can be used for `output_device`/`input_device` in
/// `mahir.toml`.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let host = quiet_alsa(cpal::default_host);

    println!();
    for direction in [Direction::Output, Direction::Input] {
        let devices = quiet_alsa(|| list_devices(&host, direction))?;
        let default_name = quiet_alsa(|| match direction {
            Direction::Input => host.default_input_device(),
            Direction::Output => host.default_output_device(),
        })
        .and_then(|d| d.name().ok());

        let heading = match direction {
            Direction::Output => "Output devices (tones and metronome)",
            Direction::Input => "Input devices (recording)",
        };
        println!("{heading}:");
        println!();

        if devices.is_empty() {
            println!("  none found");
            println!();
            continue;
        }

        for (index, device) in devices.iter().enumerate() {
            let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            let default_indicator = if default_name.as_deref() == Some(name.as_str()) {
                " [DEFAULT]"
            } else {
                ""
            };

            let config = quiet_alsa(|| match direction {
                Direction::Input => device.default_input_config(),
                Direction::Output => device.default_output_config(),
            });
            let config_info = match config {
                Ok(config) => format!("{}Hz, {} channels", config.sample_rate().0, config.channels()),
                Err(_) => "configuration unavailable".to_string(),
            };

            println!("  ID: {index}");
            println!("    Name: {name}{default_indicator}");
            println!("    Config: {config_info}");
            println!();
        }
    }

    Ok(())
}
