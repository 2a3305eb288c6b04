use std::path::Path;

use anyhow::Context as _;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::domain::repository::Mailer;
use crate::domain::types::AUTHCODE_TTL_SECS;
use crate::error::ApiServiceError;

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Writes `.eml` files into a directory. Used when no SMTP relay is set.
    File(AsyncFileTransport<Tokio1Executor>),
}

#[derive(Clone)]
pub struct LettreMailer {
    transport: Transport,
    from: Mailbox,
}

impl LettreMailer {
    pub fn new(
        smtp: Option<&SmtpConfig>,
        from: &str,
        spool_dir: &str,
    ) -> anyhow::Result<Self> {
        let from = from.parse::<Mailbox>().context("parse MAIL_FROM")?;
        let transport = match smtp {
            Some(smtp) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .context("create SMTP transport")?
                    .port(smtp.port);
                if !smtp.username.is_empty() {
                    builder = builder.credentials(Credentials::new(
                        smtp.username.clone(),
                        smtp.password.clone(),
                    ));
                }
                Transport::Smtp(builder.build())
            }
            None => {
                let dir = Path::new(spool_dir);
                std::fs::create_dir_all(dir).context("create mail spool directory")?;
                tracing::warn!(dir = %spool_dir, "SMTP_HOST not set, spooling mail to disk");
                Transport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };
        Ok(Self { transport, from })
    }
}

impl Mailer for LettreMailer {
    async fn send_authcode(&self, email: &str, code: &str) -> Result<(), ApiServiceError> {
        let to = email
            .parse::<Mailbox>()
            .map_err(|_| ApiServiceError::invalid("invalid email address"))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your ResourceHub sign-in code")
            .header(ContentType::TEXT_PLAIN)
            .body(authcode_body(code))
            .context("build authcode email")?;

        match &self.transport {
            Transport::Smtp(smtp) => {
                smtp.send(message).await.context("send SMTP email")?;
            }
            Transport::File(file) => {
                file.send(message).await.context("spool email")?;
            }
        }
        Ok(())
    }
}

fn authcode_body(code: &str) -> String {
    format!(
        "Your sign-in code is {code}.\n\n\
         It expires in {} minutes. If you did not request it, ignore this email.\n",
        AUTHCODE_TTL_SECS / 60
    )
}
