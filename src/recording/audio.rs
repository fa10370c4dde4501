//! Microphone capture for the pad.
//!
//! Captures PCM audio from a configured input device, downmixing to mono at
//! the device's native sample rate. Captured audio leaves this module only
//! as [`Take`]s written through the scratch store; the device is released
//! when the controller is finished or dropped.

use crate::media::{HandleStore, Take};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Controls one microphone capture session.
///
/// Holding the controller holds the input device. Dropping it (or calling
/// [`CaptureController::finish`]) stops the stream and releases the device.
pub struct CaptureController {
    /// Actual capture sample rate from the device
    sample_rate: u32,
    /// Captured audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive while capturing)
    stream: Option<cpal::Stream>,
    /// Device name, index or "default" from configuration
    device_name: String,
}

impl CaptureController {
    /// Creates a controller for the given device without opening it.
    ///
    /// The actual sample rate may differ once [`start`](Self::start) has
    /// negotiated with the device.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            device_name,
        }
    }

    /// Opens the input device and starts capturing.
    ///
    /// # Errors
    /// - If the configured device is not available
    /// - If device configuration fails
    /// - If the audio stream cannot be created or started
    pub fn start(&mut self) -> Result<()> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;

        let samples_arc = Arc::clone(&self.samples);
        let callback_channels = num_channels;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                Self::handle_audio_callback(data, &samples_arc, callback_channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Writes everything captured so far as a take, without stopping.
    ///
    /// Returns `Ok(None)` when nothing has been captured yet.
    ///
    /// # Errors
    /// - If the WAV file cannot be written
    pub fn snapshot(&self, store: &HandleStore) -> Result<Option<Take>> {
        let samples = self.samples.lock().unwrap().clone();
        self.take_from_samples(samples, store)
    }

    /// Stops capturing, releases the device and returns the final take.
    ///
    /// Returns `Ok(None)` when nothing was captured (for example when the
    /// session was stopped immediately).
    ///
    /// # Errors
    /// - If the WAV file cannot be written
    pub fn finish(mut self, store: &HandleStore) -> Result<Option<Take>> {
        self.stream = None;

        let samples = self.samples.lock().unwrap().clone();
        let sample_count = samples.len();
        let duration_secs = sample_count as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            sample_count,
            self.sample_rate
        );

        self.take_from_samples(samples, store)
    }

    fn take_from_samples(&self, samples: Vec<i16>, store: &HandleStore) -> Result<Option<Take>> {
        if samples.is_empty() {
            tracing::warn!("Capture has no samples yet");
            return Ok(None);
        }
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        let handle = store.create_wav(&samples, self.sample_rate)?;
        Ok(Some(Take::from_capture(handle, duration_secs)))
    }

    /// Downmixes incoming device frames to mono and appends them.
    fn handle_audio_callback(
        data: &[i16],
        samples_arc: &Arc<Mutex<Vec<i16>>>,
        num_channels: usize,
    ) {
        let mut samples = samples_arc.lock().unwrap();

        match num_channels {
            1 => {
                samples.extend_from_slice(data);
            }
            2 => {
                for chunk in data.chunks_exact(2) {
                    let left = chunk[0] as i32;
                    let right = chunk[1] as i32;
                    let mono = ((left + right) / 2) as i16;
                    samples.push(mono);
                }
            }
            _ => {
                for chunk in data.chunks_exact(num_channels) {
                    let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                    let mono = (sum / num_channels as i32) as i16;
                    samples.push(mono);
                }
            }
        }
    }

    /// Returns up to `max` of the most recent samples, for level metering.
    pub fn recent_samples(&self, max: usize) -> Vec<i16> {
        let samples = self.samples.lock().unwrap();
        let start = samples.len().saturating_sub(max);
        samples[start..].to_vec()
    }

    /// Returns the number of captured samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Returns the actual capture sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Returns the names of all input devices the host reports.
///
/// Devices whose names cannot be queried are skipped.
///
/// # Errors
/// - If devices cannot be enumerated
pub fn input_device_names() -> Result<Vec<String>> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    })
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - A device name or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    // Try to find by name
    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'voxpad list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    // Open /dev/null for writing
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    // Redirect stderr to /dev/null
    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    // Execute the closure
    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
