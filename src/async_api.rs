use crate::cdp::CdpEngine;
use crate::driver::{CaptureRequest, DriverConfig, PageDriver};
use crate::{Error, Result};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Navigate(String, oneshot::Sender<Result<()>>),
    SetViewport(u32, u32, oneshot::Sender<Result<()>>),
    ContentHeight(oneshot::Sender<Result<u32>>),
    ScrollBy(u32, oneshot::Sender<Result<()>>),
    ScrollToTop(oneshot::Sender<Result<()>>),
    WaitForImages(oneshot::Sender<Result<()>>),
    Capture(CaptureRequest, oneshot::Sender<Result<()>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly browser backed by a dedicated worker thread.
///
/// The worker thread owns the synchronous `CdpEngine` and executes commands
/// sent from async tasks one at a time, in the order they were sent.
#[derive(Clone)]
pub struct Browser {
    cmd_tx: Sender<Command>,
}

/// Handle to the page shared by every job; implements [`PageDriver`].
#[derive(Clone)]
pub struct Page {
    cmd_tx: Sender<Command>,
}

impl Browser {
    /// Launch the browser on a background thread.
    ///
    /// A launch failure is reported here and leaves nothing running.
    pub async fn launch(config: DriverConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            let mut engine = match CdpEngine::launch(config) {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            // Command loop; ends on Close or when every handle is dropped
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Navigate(url, resp) => {
                        let _ = resp.send(engine.navigate(&url));
                    }
                    Command::SetViewport(width, height, resp) => {
                        let _ = resp.send(engine.set_viewport(width, height));
                    }
                    Command::ContentHeight(resp) => {
                        let _ = resp.send(engine.content_height());
                    }
                    Command::ScrollBy(delta, resp) => {
                        let _ = resp.send(engine.scroll_by(delta));
                    }
                    Command::ScrollToTop(resp) => {
                        let _ = resp.send(engine.scroll_to_top());
                    }
                    Command::WaitForImages(resp) => {
                        let _ = resp.send(engine.wait_for_images());
                    }
                    Command::Capture(request, resp) => {
                        let res = engine.capture(&request).map(|_| ());
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(engine.close());
                        return;
                    }
                }
            }
            log::debug!("All browser handles dropped; closing");
            let _ = engine.close();
        });

        let init_res = init_rx
            .await
            .map_err(|e| Error::InitializationError(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Handle to the browser's page.
    pub async fn new_page(&self) -> Result<Page> {
        Ok(Page {
            cmd_tx: self.cmd_tx.clone(),
        })
    }

    /// Shut down the worker and the browser. Safe to call after the page
    /// was already closed.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Close(tx)).is_err() {
            return Ok(());
        }
        rx.await.unwrap_or(Ok(()))
    }
}

impl Page {
    async fn request<T>(
        &self,
        what: &str,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(command(tx))
            .map_err(|_| Error::Other(format!("{} failed: browser is closed", what)))?;
        rx.await
            .map_err(|e| Error::Other(format!("{} canceled: {}", what, e)))?
    }
}

impl PageDriver for Page {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.request("Navigate", |tx| Command::Navigate(url, tx)).await
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.request("SetViewport", |tx| Command::SetViewport(width, height, tx))
            .await
    }

    async fn content_height(&mut self) -> Result<u32> {
        self.request("ContentHeight", Command::ContentHeight).await
    }

    async fn scroll_by(&mut self, delta: u32) -> Result<()> {
        self.request("ScrollBy", |tx| Command::ScrollBy(delta, tx)).await
    }

    async fn scroll_to_top(&mut self) -> Result<()> {
        self.request("ScrollToTop", Command::ScrollToTop).await
    }

    async fn wait_for_images(&mut self) -> Result<()> {
        self.request("WaitForImages", Command::WaitForImages).await
    }

    async fn capture(&mut self, request: &CaptureRequest) -> Result<()> {
        let request = request.clone();
        self.request("Capture", |tx| Command::Capture(request, tx)).await
    }

    async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Close(tx)).is_err() {
            return Ok(());
        }
        rx.await.unwrap_or(Ok(()))
    }
}
