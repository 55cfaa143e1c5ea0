use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("SMTP configuration error: {0}")]
    Config(String),
    #[error("Email sending failed: {0}")]
    Send(#[from] lettre::transport::smtp::Error),
    #[error("Message building failed: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("Address parsing failed: {0}")]
    Address(#[from] lettre::address::AddressError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub base_url: String, // For links back to the campaign pages
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, EmailError> {
        Ok(Self {
            smtp_server: required("SMTP_SERVER")?,
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| EmailError::Config("Invalid SMTP_PORT".to_string()))?,
            username: required("SMTP_USERNAME")?,
            password: required("SMTP_PASSWORD")?,
            from_email: required("FROM_EMAIL")?,
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Sevakriti".to_string()),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String, EmailError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| EmailError::Config(format!("{} not set", key)))
}

pub struct EmailService {
    mailer: SmtpTransport,
    config: EmailConfig,
}

impl EmailService {
    pub fn new() -> Result<Self, EmailError> {
        let config = EmailConfig::from_env()?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.smtp_server)
            .map_err(|e| EmailError::Config(format!("SMTP relay error: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    pub fn send_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        template: EmailTemplate,
    ) -> Result<(), EmailError> {
        let message_builder = Message::builder()
            .from(mailbox(&self.config.from_email, Some(&self.config.from_name))?)
            .to(mailbox(to_email, to_name)?)
            .subject(&template.subject);

        let message = match &template.text_body {
            Some(text_body) => message_builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(template.html_body.clone()),
                    ),
            )?,
            None => message_builder
                .header(ContentType::TEXT_HTML)
                .body(template.html_body.clone())?,
        };

        info!("Sending email to: {}", to_email);
        self.mailer.send(&message)?;
        info!("Email sent successfully to: {}", to_email);

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// The display name is kept apart from the address and never parsed.
fn mailbox(email: &str, name: Option<&str>) -> Result<Mailbox, EmailError> {
    Ok(Mailbox::new(name.map(str::to_string), email.trim().parse()?))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn donation_receipt_template(
    base_url: &str,
    donor_name: &str,
    amount: Decimal,
    campaign: Option<(&str, uuid::Uuid)>,
    transaction_id: &str,
) -> EmailTemplate {
    let (purpose_html, purpose_text) = match campaign {
        Some((title, id)) => (
            format!(
                r#"towards <a href="{}/campaigns/{}">{}</a>"#,
                base_url,
                id,
                escape_html(title)
            ),
            format!("towards \"{}\"", title),
        ),
        None => (
            "to our general fund".to_string(),
            "to our general fund".to_string(),
        ),
    };

    let html_body = format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="utf-8">
            <title>Donation receipt</title>
            <style>
                body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
                .header {{ background-color: #7c3aed; color: white; padding: 20px; text-align: center; }}
                .content {{ padding: 20px; background-color: #f9f9f9; }}
                .footer {{ padding: 20px; text-align: center; color: #666; font-size: 12px; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="header">
                    <h1>Thank you, {}!</h1>
                </div>
                <div class="content">
                    <p>We received your donation of <strong>{}</strong> {}.</p>
                    <p>Transaction reference: <code>{}</code></p>
                    <p>Keep this email as your receipt.</p>
                </div>
                <div class="footer">
                    <p>Sevakriti</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        escape_html(donor_name),
        amount,
        purpose_html,
        escape_html(transaction_id)
    );

    let text_body = format!(
        "Thank you, {}!\n\nWe received your donation of {} {}.\nTransaction reference: {}\n\nKeep this email as your receipt.",
        donor_name, amount, purpose_text, transaction_id
    );

    EmailTemplate {
        subject: "Your Sevakriti donation receipt".to_string(),
        html_body,
        text_body: Some(text_body),
    }
}

pub fn volunteer_welcome_template(base_url: &str, name: &str) -> EmailTemplate {
    let html_body = format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="utf-8">
            <title>Welcome aboard</title>
        </head>
        <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
            <h2>Hi {}!</h2>
            <p>Thank you for signing up to volunteer with Sevakriti.</p>
            <p>Browse the <a href="{}/campaigns">active campaigns</a> to see where you can help.</p>
        </body>
        </html>
        "#,
        escape_html(name),
        base_url
    );

    EmailTemplate {
        subject: "Welcome to the Sevakriti volunteer team".to_string(),
        html_body,
        text_body: Some(format!(
            "Hi {}!\n\nThank you for signing up to volunteer with Sevakriti.\nActive campaigns: {}/campaigns",
            name, base_url
        )),
    }
}

/// Sends mail off the request path. Disabled when SMTP is not configured.
#[derive(Clone, Default)]
pub struct Mailer {
    service: Option<Arc<EmailService>>,
}

impl Mailer {
    pub fn from_env() -> Self {
        match EmailService::new() {
            Ok(service) => {
                info!("Email notifications enabled");
                Self {
                    service: Some(Arc::new(service)),
                }
            }
            Err(e) => {
                warn!("Email notifications disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { service: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.service.as_deref().map(EmailService::base_url)
    }

    pub fn send_in_background(&self, to_email: String, to_name: Option<String>, template: EmailTemplate) {
        let Some(service) = self.service.clone() else {
            return;
        };

        tokio::task::spawn_blocking(move || {
            if let Err(e) = service.send_email(&to_email, to_name.as_deref(), template) {
                error!("Failed to send email to {}: {}", to_email, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_names_campaign_and_reference() {
        let id = uuid::Uuid::new_v4();
        let template = donation_receipt_template(
            "https://sevakriti.example",
            "Meera",
            Decimal::new(2500, 2),
            Some(("Clean water", id)),
            "TXN-1-ABCDEFGH",
        );

        assert!(template.html_body.contains("25.00"));
        assert!(template.html_body.contains(&format!("https://sevakriti.example/campaigns/{}", id)));
        let text = template.text_body.unwrap();
        assert!(text.contains("towards \"Clean water\""));
        assert!(text.contains("TXN-1-ABCDEFGH"));
    }

    #[test]
    fn receipt_without_campaign_mentions_general_fund() {
        let template = donation_receipt_template(
            "https://sevakriti.example",
            "Meera",
            Decimal::from(10),
            None,
            "TXN-2",
        );
        assert!(template.text_body.unwrap().contains("general fund"));
    }

    #[test]
    fn receipt_escapes_donor_supplied_text() {
        let template = donation_receipt_template(
            "https://sevakriti.example",
            "<img src=x onerror=alert(1)>",
            Decimal::from(5),
            Some(("Books & \"Bags\"", uuid::Uuid::new_v4())),
            "TXN-<3>",
        );

        assert!(!template.html_body.contains("<img"));
        assert!(template.html_body.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(template.html_body.contains("Books &amp; &quot;Bags&quot;"));
        assert!(template.html_body.contains("TXN-&lt;3&gt;"));
        assert!(template.text_body.unwrap().contains("<img src=x onerror=alert(1)>"));
    }

    #[test]
    fn welcome_escapes_name() {
        let template = volunteer_welcome_template("http://localhost", "Ravi <b>");
        assert!(template.html_body.contains("Hi Ravi &lt;b&gt;!"));
    }

    #[test]
    fn mailbox_accepts_names_with_punctuation() {
        let to = mailbox("a@example.org", Some("Doe, John <a@x.org>")).unwrap();
        assert_eq!(to.email.to_string(), "a@example.org");
        assert_eq!(to.name.as_deref(), Some("Doe, John <a@x.org>"));

        let bare = mailbox(" b@example.org ", None).unwrap();
        assert!(bare.name.is_none());

        assert!(matches!(
            mailbox("not-an-address", Some("X")),
            Err(EmailError::Address(_))
        ));
    }

    #[test]
    fn disabled_mailer_ignores_sends() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
        assert_eq!(mailer.base_url(), None);
        mailer.send_in_background(
            "a@example.org".to_string(),
            None,
            volunteer_welcome_template("http://localhost", "A"),
        );
    }
}
