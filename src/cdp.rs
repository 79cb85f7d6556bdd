//! Chrome DevTools Protocol backend
//!
//! `CdpEngine` is synchronous and owns the browser process and its single tab.
//! The async [`crate::async_api`] facade runs it on a worker thread.

use crate::driver::{CaptureRequest, DriverConfig};
use crate::format::OutputFormat;
use crate::{Error, Result};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::types::{Bounds, PrintToPdfOptions};
use headless_chrome::{Browser, LaunchOptions};
use std::sync::Arc;
use std::time::Duration;

const CONTENT_HEIGHT_JS: &str = r#"
(function() {
    const body = document.body;
    const root = document.documentElement;
    return Math.max(
        body ? body.scrollHeight : 0,
        body ? body.offsetHeight : 0,
        root ? root.scrollHeight : 0,
        root ? root.offsetHeight : 0
    );
})()
"#;

// Resolves once every <img> has either loaded or failed.
const WAIT_FOR_IMAGES_JS: &str = r#"
Promise.all(Array.from(document.images).map(function(img) {
    if (img.complete) { return true; }
    return new Promise(function(resolve) {
        img.addEventListener('load', resolve, { once: true });
        img.addEventListener('error', resolve, { once: true });
    });
})).then(function() { return true; })
"#;

/// Headless Chrome with one tab.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    viewport: (u32, u32),
}

impl CdpEngine {
    /// Launch the browser and open the page every job will share.
    pub fn launch(config: DriverConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to open page: {}", e)))?;

        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| Error::InitializationError(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(Self {
            browser,
            tab,
            viewport: (config.viewport.width, config.viewport.height),
        })
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation to {} failed: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for {} failed: {}", url, e)))?;

        Ok(())
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.viewport = (width, height);
        Ok(())
    }

    fn resize(&self, width: u32, height: u32) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Normal {
                left: None,
                top: None,
                width: Some(width as f64),
                height: Some(height as f64),
            })
            .map_err(|e| Error::RenderError(format!("Failed to resize viewport: {}", e)))?;
        Ok(())
    }

    pub fn content_height(&self) -> Result<u32> {
        let value = self.evaluate(CONTENT_HEIGHT_JS, false)?;
        let height = value
            .as_f64()
            .ok_or_else(|| Error::RenderError(format!("Unexpected content height: {}", value)))?;
        Ok(height.max(0.0).ceil() as u32)
    }

    pub fn scroll_by(&self, delta: u32) -> Result<()> {
        self.evaluate(&format!("window.scrollBy(0, {})", delta), false)?;
        Ok(())
    }

    pub fn scroll_to_top(&self) -> Result<()> {
        self.evaluate("window.scrollTo(0, 0)", false)?;
        Ok(())
    }

    pub fn wait_for_images(&self) -> Result<()> {
        self.evaluate(WAIT_FOR_IMAGES_JS, true)?;
        Ok(())
    }

    /// Capture according to `request` and write the bytes to its path.
    pub fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>> {
        let data = match request.format {
            OutputFormat::Pdf => self.print_pdf()?,
            OutputFormat::Jpg => self.screenshot(request, Page::CaptureScreenshotFormatOption::Jpeg)?,
            OutputFormat::Png => self.screenshot(request, Page::CaptureScreenshotFormatOption::Png)?,
        };
        std::fs::write(&request.path, &data)?;
        Ok(data)
    }

    fn screenshot(
        &self,
        request: &CaptureRequest,
        format: Page::CaptureScreenshotFormatOption,
    ) -> Result<Vec<u8>> {
        let quality = request.quality.map(u32::from);
        let clip = request.clip.map(|c| Page::Viewport {
            x: c.x as f64,
            y: c.y as f64,
            width: c.width as f64,
            height: c.height as f64,
            scale: 1.0,
        });

        if !request.full_page {
            return self
                .tab
                .capture_screenshot(format, quality, clip, true)
                .map_err(|e| Error::CaptureError(format!("Screenshot failed: {}", e)));
        }

        // Grow the window to the whole document, capture, then restore.
        let (width, height) = self.viewport;
        let full_height = self.content_height()?.max(height);
        self.resize(width, full_height)?;
        let shot = self
            .tab
            .capture_screenshot(format, quality, None, true)
            .map_err(|e| Error::CaptureError(format!("Full page screenshot failed: {}", e)));
        self.resize(width, height)?;
        shot
    }

    fn print_pdf(&self) -> Result<Vec<u8>> {
        // documents are captured as shown on screen, not with print styles
        self.tab
            .call_method(screen_media())
            .map_err(|e| Error::CaptureError(format!("Failed to emulate screen media: {}", e)))?;

        let options = PrintToPdfOptions {
            prefer_css_page_size: Some(true),
            print_background: Some(true),
            ..Default::default()
        };
        self.tab
            .print_to_pdf(Some(options))
            .map_err(|e| Error::CaptureError(format!("PDF generation failed: {}", e)))
    }

    fn evaluate(&self, script: &str, await_promise: bool) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(script, await_promise)
            .map_err(|e| Error::RenderError(format!("Evaluation failed: {}", e)))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    pub fn close(self) -> Result<()> {
        // Dropping the browser terminates the child process.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

fn screen_media() -> Emulation::SetEmulatedMedia {
    Emulation::SetEmulatedMedia {
        media: Some("screen".to_string()),
        features: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_uses_screen_media() {
        assert_eq!(screen_media().media.as_deref(), Some("screen"));
        assert!(screen_media().features.is_none());
    }

    #[test]
    #[ignore] // requires Chrome
    fn test_cdp_engine_launch() {
        let engine = CdpEngine::launch(DriverConfig::default()).expect("Chrome should launch");
        assert!(engine.close().is_ok());
    }
}
