//! 邮件客户端
//!
//! 封装事务邮件 API 的发送调用：HTML 正文加一个 PDF 附件，
//! 同步发出、不重试，失败直接回报给调用方。

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;

/// 待发送的一封邮件
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to: String,
    pub cc: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

/// 邮件发送能力
#[allow(async_fn_in_trait)]
pub trait MailClient {
    async fn send(&self, mail: &OutboundMail) -> Result<()>;
}

/// SendGrid 风格的 REST 客户端
#[derive(Clone)]
pub struct SendGridClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.mail_api_base_url.clone(),
            api_key: config.mail_api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    fn build_payload(&self, mail: &OutboundMail) -> Value {
        let mut personalization = json!({
            "to": [{ "email": mail.to }],
        });
        if let Some(cc) = &mail.cc {
            personalization["cc"] = json!([{ "email": cc }]);
        }

        json!({
            "personalizations": [personalization],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": mail.subject,
            "content": [{ "type": "text/html", "value": mail.html_body }],
            "attachments": [{
                "content": BASE64.encode(&mail.attachment),
                "type": "application/pdf",
                "filename": mail.attachment_name,
                "disposition": "attachment",
            }],
        })
    }
}

impl MailClient for SendGridClient {
    async fn send(&self, mail: &OutboundMail) -> Result<()> {
        debug!("寄送邮件给 {} (附件: {})", mail.to, mail.attachment_name);

        let url = format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'));
        let payload = self.build_payload(mail);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::Mail(crate::error::MailError::RequestFailed {
                    source: Box::new(e),
                })
            })?;

        let status = resp.status();
        if !(200..300).contains(&status.as_u16()) {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::mail_send_failed(status.as_u16(), body).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SendGridClient {
        let config = Config {
            mail_api_key: "SG.test".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "自動發送系統".to_string(),
            ..Config::default()
        };
        SendGridClient::new(&config)
    }

    fn mail(cc: Option<&str>) -> OutboundMail {
        OutboundMail {
            to: "parent@example.com".to_string(),
            cc: cc.map(str::to_string),
            subject: "【工作紙】測試".to_string(),
            html_body: "<p>你好</p>".to_string(),
            attachment_name: "test_Worksheet.pdf".to_string(),
            attachment: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_payload_without_cc() {
        let payload = client().build_payload(&mail(None));
        assert!(payload["personalizations"][0].get("cc").is_none());
        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "parent@example.com"
        );
        assert_eq!(payload["attachments"][0]["type"], "application/pdf");
    }

    #[test]
    fn test_payload_with_cc_and_encoded_attachment() {
        let payload = client().build_payload(&mail(Some("teacher@example.com")));
        assert_eq!(
            payload["personalizations"][0]["cc"][0]["email"],
            "teacher@example.com"
        );
        // [1, 2, 3] 的标准 base64
        assert_eq!(payload["attachments"][0]["content"], "AQID");
    }
}
