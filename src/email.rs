//! Contact-form plumbing: CAPTCHA verification and the SMTP relay.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use thiserror::Error;

use crate::config::EmailConfig;

pub type Mailer = AsyncSmtpTransport<Tokio1Executor>;

const CAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Build the SMTP transport once at startup.
pub fn build_mailer(config: &EmailConfig) -> Result<Mailer, lettre::transport::smtp::Error> {
    Ok(Mailer::relay(&config.smtp_host)?
        .credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ))
        .build())
}

#[derive(Debug, Deserialize)]
struct CaptchaVerifyResponse {
    success: bool,
}

/// Server-side CAPTCHA check. Network or decode failures propagate; a clean
/// `success: false` means the token did not verify.
pub async fn verify_captcha(
    client: &reqwest::Client,
    secret: &str,
    token: &str,
) -> Result<bool, reqwest::Error> {
    let resp: CaptchaVerifyResponse = client
        .post(CAPTCHA_VERIFY_URL)
        .form(&[("secret", secret), ("response", token)])
        .send()
        .await?
        .json()
        .await?;

    Ok(resp.success)
}

/// Relay a contact-form message to the configured recipient. The sender's
/// address goes into Reply-To; the From header must stay the authenticated
/// account or most providers will refuse the message.
pub async fn send_contact_email(
    mailer: &Mailer,
    config: &EmailConfig,
    name: &str,
    from_email: &str,
    message: &str,
) -> Result<(), EmailError> {
    let from: Mailbox = config.smtp_username.parse()?;
    let reply_to: Mailbox = from_email.parse()?;
    let to: Mailbox = config.recipient.parse()?;

    let email = Message::builder()
        .from(from)
        .reply_to(reply_to)
        .to(to)
        .subject(format!("Website Contact From {name}"))
        .body(format!("From: {from_email}\n\n{message}"))?;

    mailer.send(email).await?;
    Ok(())
}
