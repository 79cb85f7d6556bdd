//! Forcing lazy content to load before a capture
//!
//! Pages that load images or sections on scroll would otherwise be captured
//! half empty. [`ScrollSettler`] walks the page one viewport at a time, returns
//! to the top and waits for every image before handing over to the capture.

use std::time::Duration;

use crate::driver::PageDriver;
use crate::Result;

/// Strategy run between navigation and capture.
#[allow(async_fn_in_trait)]
pub trait SettleStrategy {
    async fn settle<D: PageDriver>(&self, driver: &mut D, viewport_height: u32) -> Result<()>;
}

/// Pauses used by [`ScrollSettler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTiming {
    /// After every scroll step
    pub step_pause: Duration,
    /// After images finished loading
    pub final_pause: Duration,
}

impl Default for SettleTiming {
    fn default() -> Self {
        Self {
            step_pause: Duration::from_millis(100),
            final_pause: Duration::from_millis(250),
        }
    }
}

/// Incremental scroll-and-pause, then re-settle at the top.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollSettler {
    timing: SettleTiming,
}

impl ScrollSettler {
    pub fn new(timing: SettleTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> SettleTiming {
        self.timing
    }
}

impl SettleStrategy for ScrollSettler {
    async fn settle<D: PageDriver>(&self, driver: &mut D, viewport_height: u32) -> Result<()> {
        let step = viewport_height.max(1);
        let content_height = driver.content_height().await?;

        let mut offset: u32 = 0;
        let mut steps = 0usize;
        while offset.saturating_add(step) < content_height {
            driver.scroll_by(step).await?;
            tokio::time::sleep(self.timing.step_pause).await;
            offset = offset.saturating_add(step);
            steps += 1;
        }
        log::debug!(
            "Scrolled {} step(s) over {}px of content",
            steps,
            content_height
        );

        driver.scroll_to_top().await?;
        driver.wait_for_images().await?;
        tokio::time::sleep(self.timing.final_pause).await;
        Ok(())
    }
}

/// Skips settling entirely; the capture follows navigation directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettle;

impl SettleStrategy for NoSettle {
    async fn settle<D: PageDriver>(&self, _driver: &mut D, _viewport_height: u32) -> Result<()> {
        Ok(())
    }
}
