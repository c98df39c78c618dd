use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::traits::{NotificationReceipt, Notifier};
use crate::config::SmtpConfig;
use crate::models::DealResult;
use crate::utils::error::Result;

pub const SUBJECT: &str = "🤑 Online Deals Found!";

pub struct EmailNotifier {
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        EmailNotifier { config }
    }

    fn format_text_body(&self, deals: &[DealResult]) -> String {
        deals
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn build_message(&self, deals: &[DealResult]) -> Result<Message> {
        let from: Mailbox = self.config.sender_email.parse()?;
        let to: Mailbox = self.config.receiver_email.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .header(header::ContentType::TEXT_PLAIN)
            .body(self.format_text_body(deals))?;
        Ok(message)
    }

    /// STARTTLS transport without connection pooling: each send opens its
    /// own connection and closes it when done, on success or failure.
    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = Credentials::new(
            self.config.sender_email.clone(),
            self.config.sender_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)?
            .port(self.config.port)
            .credentials(credentials)
            .build();
        Ok(mailer)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, deals: &[DealResult]) -> Result<NotificationReceipt> {
        tracing::info!("Sending email with deals...");

        let email = self.build_message(deals)?;
        let mailer = self.build_transport()?;

        let response = mailer.send(email).await?;
        tracing::info!("✅ Email sent successfully!");

        Ok(NotificationReceipt {
            notifier: self.name().to_string(),
            message_id: response.first_line().map(str::to_string),
            deal_count: deals.len(),
        })
    }
}
