//! Recording page driver shared by the integration tests

#![allow(dead_code)]

use pageshots::{CaptureRequest, Error, PageDriver, Result};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    SetViewport(u32, u32),
    ContentHeight,
    ScrollBy(u32),
    ScrollToTop,
    WaitForImages,
    Capture(CaptureRequest),
    Close,
}

/// Shared log of driver calls with the (virtual) time each happened at.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(Call, Instant)>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push((call, Instant::now()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn time_of(&self, pred: impl Fn(&Call) -> bool) -> Instant {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| pred(c))
            .map(|(_, t)| *t)
            .expect("call not recorded")
    }

    pub fn times_of(&self, pred: impl Fn(&Call) -> bool) -> Vec<Instant> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| pred(c))
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|(c, _)| pred(c)).count()
    }
}

#[derive(Clone, Default)]
pub struct RecordingDriver {
    pub log: CallLog,
    pub content_height: u32,
    /// Navigating to any of these fails
    pub failing_urls: Vec<String>,
    pub fail_capture: bool,
    /// Every navigation fails as if the browser went away
    pub disconnected: bool,
    /// Write a small file at the capture path
    pub write_files: bool,
}

impl RecordingDriver {
    pub fn new(content_height: u32) -> Self {
        Self {
            content_height,
            ..Default::default()
        }
    }
}

impl PageDriver for RecordingDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.push(Call::Navigate(url.to_string()));
        if self.disconnected {
            return Err(Error::Other("Navigate failed: browser is closed".into()));
        }
        if self.failing_urls.iter().any(|u| u == url) {
            return Err(Error::LoadError(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        Ok(())
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.log.push(Call::SetViewport(width, height));
        Ok(())
    }

    async fn content_height(&mut self) -> Result<u32> {
        self.log.push(Call::ContentHeight);
        Ok(self.content_height)
    }

    async fn scroll_by(&mut self, delta: u32) -> Result<()> {
        self.log.push(Call::ScrollBy(delta));
        Ok(())
    }

    async fn scroll_to_top(&mut self) -> Result<()> {
        self.log.push(Call::ScrollToTop);
        Ok(())
    }

    async fn wait_for_images(&mut self) -> Result<()> {
        self.log.push(Call::WaitForImages);
        Ok(())
    }

    async fn capture(&mut self, request: &CaptureRequest) -> Result<()> {
        self.log.push(Call::Capture(request.clone()));
        if self.fail_capture {
            return Err(Error::CaptureError("disk full".into()));
        }
        if self.write_files {
            std::fs::write(&request.path, b"shot")?;
        }
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.log.push(Call::Close);
        Ok(())
    }
}
