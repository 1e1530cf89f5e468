use crate::error::{ConfigError, MailError};
use crate::model::{HeaderFields, ReportDocument, XLSX_MIME};
use std::fmt;

#[cfg(feature = "mail")]
use lettre::message::header::ContentType;
#[cfg(feature = "mail")]
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
#[cfg(feature = "mail")]
use lettre::transport::smtp::authentication::Credentials;
#[cfg(feature = "mail")]
use lettre::transport::smtp::client::{Tls, TlsParameters};
#[cfg(feature = "mail")]
use lettre::{Message, SmtpTransport, Transport};

pub const ENV_HOST: &str = "INSPECTION_SMTP_HOST";
pub const ENV_PORT: &str = "INSPECTION_SMTP_PORT";
pub const ENV_SENDER: &str = "INSPECTION_SMTP_SENDER";
pub const ENV_PASSWORD: &str = "INSPECTION_SMTP_PASSWORD";

const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP connection settings, read from the environment at call time.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source. The port defaults to 465.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let port = match lookup(ENV_PORT) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar {
                    name: ENV_PORT,
                    value,
                })?,
            None => IMPLICIT_TLS_PORT,
        };
        Ok(SmtpSettings {
            host: required(ENV_HOST)?,
            port,
            sender: required(ENV_SENDER)?,
            password: required(ENV_PASSWORD)?,
        })
    }
}

/// What the mail collaborator needs to send one report.
#[derive(Debug, Clone)]
pub struct MailRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Vec<u8>,
    pub attachment_name: String,
}

impl MailRequest {
    pub fn for_report(recipients: &[String], report: &ReportDocument, header: &HeaderFields) -> Self {
        let body = format!(
            "入荷検査結果を送付します。\n\n検査ID: {}\nIN.NO: {}\nロットNO: {}\n作業者: {}\n確認者: {}\n検査日: {}\n",
            header.inspection_id,
            header.in_no,
            header.lot_no,
            header.operator,
            header.reviewer,
            header.inspection_date
        );
        MailRequest {
            recipients: recipients.to_vec(),
            subject: format!("入荷検査結果 {}", header.inspection_id),
            body,
            attachment: report.bytes.clone(),
            attachment_name: report.filename.clone(),
        }
    }
}

/// Result of a dispatch attempt, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
}

impl DispatchOutcome {
    pub fn sent(count: usize) -> Self {
        DispatchOutcome {
            success: true,
            message: format!("メール送信完了: {} 件の宛先", count),
        }
    }

    pub fn failed(err: &MailError) -> Self {
        DispatchOutcome {
            success: false,
            message: format!("メール送信エラー: {}", err),
        }
    }
}

/// Assemble the message: plain text body plus the xlsx attachment.
#[cfg(feature = "mail")]
pub fn build_message(sender: &str, request: &MailRequest) -> Result<Message, MailError> {
    if request.recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }

    let from: Mailbox = sender
        .parse()
        .map_err(|_| MailError::Address(sender.to_string()))?;
    let mut builder = Message::builder().from(from).subject(request.subject.as_str());
    for recipient in &request.recipients {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| MailError::Address(recipient.clone()))?;
        builder = builder.to(to);
    }

    let content_type =
        ContentType::parse(XLSX_MIME).map_err(|e| MailError::Build(e.to_string()))?;
    let attachment = Attachment::new(request.attachment_name.clone())
        .body(request.attachment.clone(), content_type);

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(request.body.clone()))
                .singlepart(attachment),
        )
        .map_err(|e| MailError::Build(e.to_string()))
}

#[cfg(feature = "mail")]
pub struct Mailer {
    smtp: SmtpTransport,
    sender: String,
}

#[cfg(feature = "mail")]
impl Mailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let creds = Credentials::new(settings.sender.clone(), settings.password.clone());

        let tls_parameters = TlsParameters::new(settings.host.clone())
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let tls = if settings.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Required(tls_parameters)
        };

        let smtp = SmtpTransport::relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .credentials(creds)
            .port(settings.port)
            .tls(tls)
            .build();

        Ok(Mailer {
            smtp,
            sender: settings.sender.clone(),
        })
    }

    /// Send once. Failures are reported, never retried.
    pub fn send(&self, request: &MailRequest) -> DispatchOutcome {
        let result = build_message(&self.sender, request).and_then(|message| {
            self.smtp
                .send(&message)
                .map_err(|e| MailError::Transport(e.to_string()))
        });
        match result {
            Ok(_) => {
                log::info!("report {} mailed to {} recipients", request.attachment_name, request.recipients.len());
                DispatchOutcome::sent(request.recipients.len())
            }
            Err(e) => {
                log::warn!("mail dispatch failed: {}", e);
                DispatchOutcome::failed(&e)
            }
        }
    }
}

/// Connect with `settings` and send `request`, folding every failure into
/// the outcome.
#[cfg(feature = "mail")]
pub fn dispatch_report(settings: &SmtpSettings, request: &MailRequest) -> DispatchOutcome {
    match Mailer::new(settings) {
        Ok(mailer) => mailer.send(request),
        Err(e) => DispatchOutcome::failed(&e),
    }
}
