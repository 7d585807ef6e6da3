//! Host capabilities for a headless runtime.
//!
//! There are no windows or notification tray behind the stdio transport, so
//! every capability request is recorded in the log and reported as honored.

use async_trait::async_trait;
use offgrid_client::{Host, Notification};
use offgrid_core::Error;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogHost;

#[async_trait]
impl Host for LogHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        tracing::info!("skip waiting requested");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        tracing::info!("claiming clients");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            url = ?notification.data.url,
            "show notification"
        );
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, "close notification");
        Ok(())
    }

    async fn focus_or_open_window(&self, url: &str) -> Result<(), Error> {
        tracing::info!(url, "focus or open window");
        Ok(())
    }
}
