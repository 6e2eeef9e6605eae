// src/notify/email.rs
use super::{Notifier, NotifyError};
use crate::config::EmailConfig;
use crate::monitor::{HealthState, Notification};
use askama::Template;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use url::Url;

const SUPPRESSION_NOTE: &str = "Further notifications will be suppressed.";

/// Values shared by the plain-text and HTML templates.
struct ReportFields<'a> {
    service: &'a str,
    state: HealthState,
    body: String,
    code: u16,
    tko: u32,
    soft: String,
    hard: String,
    target: &'a str,
    note: &'static str,
}

#[derive(Template)]
#[template(path = "email.txt", escape = "none")]
struct EmailText<'a> {
    report: &'a ReportFields<'a>,
}

#[derive(Template)]
#[template(path = "email.html")]
struct EmailHtml<'a> {
    report: &'a ReportFields<'a>,
    colour: &'static str,
}

/// Plain-text and HTML bodies for one notification.
pub struct EmailReport<'a> {
    pub service: &'a str,
    pub target: &'a Url,
    pub notification: &'a Notification,
}

impl<'a> EmailReport<'a> {
    pub fn subject(&self) -> String {
        format!("{} Service Notification", self.service)
    }

    fn fields(&self) -> ReportFields<'_> {
        let n = self.notification;
        ReportFields {
            service: self.service,
            state: n.classification,
            body: n.result.body(),
            code: n.result.status_code(),
            tko: n.tko,
            soft: n.streak_start().human_time(),
            hard: n.result.human_time(),
            target: self.target.as_str(),
            note: if n.final_notice { SUPPRESSION_NOTE } else { "" },
        }
    }

    fn colour(&self) -> &'static str {
        match self.notification.classification {
            HealthState::Warning => "ff8c00",
            HealthState::Critical => "ff0000",
            HealthState::Ok => "00ff00",
        }
    }

    pub fn text(&self) -> askama::Result<String> {
        EmailText {
            report: &self.fields(),
        }
        .render()
    }

    /// Response bodies and the target URL are HTML-escaped.
    pub fn html(&self) -> askama::Result<String> {
        EmailHtml {
            report: &self.fields(),
            colour: self.colour(),
        }
        .render()
    }
}

/// Sends multipart reports over plain SMTP.
pub struct EmailNotifier {
    service: String,
    target: Url,
    from: Mailbox,
    to: Vec<Mailbox>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Addresses are parsed up front so a bad config fails at startup.
    pub fn new(config: &EmailConfig, target: Url) -> Result<Self, NotifyError> {
        let from: Mailbox = config.from.parse()?;
        let to = config
            .to
            .iter()
            .map(|addr| addr.parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
            .port(config.smtp_port)
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            service: config.service_name.clone(),
            target,
            from,
            to,
            transport,
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let report = EmailReport {
            service: &self.service,
            target: &self.target,
            notification,
        };

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(report.subject());
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        let message = builder.multipart(MultiPart::alternative_plain_html(
            report.text()?,
            report.html()?,
        ))?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        self.transport.send(message).await?;
        debug!(recipients = self.to.len(), "Mail sent");
        Ok(())
    }
}
