use async_trait::async_trait;
use reqwest::Client;

use crate::{config::TelegramConfig, error::AppError, pipeline::TokenSnapshot};

use super::{message, AlertDetails, Notifier};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Sends alerts to one Telegram chat through the Bot API
pub struct TelegramNotifier {
    http: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(http: Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_alert(
        &self,
        snapshot: &TokenSnapshot,
        details: &AlertDetails,
    ) -> Result<(), AppError> {
        let payload = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": message::render(snapshot, details),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true
        });

        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, self.config.bot_token);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notify(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Notify(format!(
                "Telegram API returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
