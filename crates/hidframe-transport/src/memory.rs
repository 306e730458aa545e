//! In-process HID backend.
//!
//! Devices are attached to a [`MemoryBackend`] and observed through the
//! returned [`MemoryDevice`] handle: every output report a session writes is
//! recorded, and input reports are served from a queue the test (or the
//! loopback switch) fills. Reads never block; an empty queue behaves like an
//! expired timeout.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{DeviceInfo, HidBackend, HidSession};

#[derive(Debug, Default)]
struct DeviceState {
    written: Vec<Bytes>,
    input: VecDeque<Bytes>,
    loopback: bool,
    fail_after: Option<usize>,
    open_count: usize,
}

/// Shared handle to one simulated HID interface.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    info: DeviceInfo,
    state: Arc<Mutex<DeviceState>>,
}

impl MemoryDevice {
    /// Create a detached device. Use [`MemoryDevice::session`] to talk to it
    /// without going through enumeration.
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            state: Arc::new(Mutex::new(DeviceState::default())),
        }
    }

    /// Enumeration entry for this device.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Open a new session on this device.
    pub fn session(&self) -> MemorySession {
        self.state().open_count += 1;
        MemorySession {
            device: self.clone(),
            closed: false,
        }
    }

    /// Output reports written so far, in write order.
    pub fn written(&self) -> Vec<Bytes> {
        self.state().written.clone()
    }

    /// Drop the recorded output reports.
    pub fn clear_written(&self) {
        self.state().written.clear();
    }

    /// Queue an input report for the next `read`.
    pub fn push_input(&self, report: impl Into<Bytes>) {
        self.state().input.push_back(report.into());
    }

    /// Number of input reports not yet read.
    pub fn pending_input(&self) -> usize {
        self.state().input.len()
    }

    /// When enabled, every written report is also queued as an input report.
    pub fn set_loopback(&self, enabled: bool) {
        self.state().loopback = enabled;
    }

    /// Accept `count` more writes, then fail every write after that.
    pub fn fail_writes_after(&self, count: usize) {
        self.state().fail_after = Some(count);
    }

    /// How many sessions have been opened on this device.
    pub fn open_count(&self) -> usize {
        self.state().open_count
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Session on a [`MemoryDevice`].
#[derive(Debug)]
pub struct MemorySession {
    device: MemoryDevice,
    closed: bool,
}

impl MemorySession {
    /// The device this session talks to.
    pub fn device(&self) -> &MemoryDevice {
        &self.device
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl HidSession for MemorySession {
    fn write(&mut self, report: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let mut state = self.device.state();
        if let Some(remaining) = state.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(TransportError::Write("injected write failure".to_string()));
            }
            *remaining -= 1;
        }

        let report = Bytes::copy_from_slice(report);
        trace!(len = report.len(), "memory session write");
        if state.loopback {
            state.input.push_back(report.clone());
        }
        state.written.push(report);
        Ok(())
    }

    fn read(&mut self, max_len: usize, _timeout: Option<Duration>) -> Result<Option<Bytes>> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let next = self.device.state().input.pop_front();
        Ok(next.map(|mut report| {
            report.truncate(max_len);
            report
        }))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Backend listing the attached [`MemoryDevice`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    devices: Arc<Mutex<Vec<MemoryDevice>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device so it shows up in enumeration.
    pub fn attach(&self, info: DeviceInfo) -> MemoryDevice {
        let device = MemoryDevice::new(info);
        self.devices().push(device.clone());
        device
    }

    fn devices(&self) -> MutexGuard<'_, Vec<MemoryDevice>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HidBackend for MemoryBackend {
    type Session = MemorySession;

    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self.devices().iter().map(|d| d.info.clone()).collect())
    }

    fn open(&self, path: &str) -> Result<MemorySession> {
        let devices = self.devices();
        let device = devices
            .iter()
            .find(|d| d.info.path == path)
            .ok_or_else(|| TransportError::Open {
                path: path.to_string(),
                reason: "no such device".to_string(),
            })?;
        Ok(device.session())
    }
}
