//! 发送服务 - 业务能力层
//!
//! 负责单个学生的工作纸寄送：收件地址校验、CC 规则、
//! 附件命名与邮件内容模板。只处理一封邮件，不关心批次流程。

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use crate::clients::mail::{MailClient, OutboundMail};
use crate::error::AppError;
use crate::models::student::StudentRow;

/// CC 栏常见的占位写法，视同没有填
const CC_PLACEHOLDERS: [&str; 4] = ["", "n/a", "nan", "none"];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("电邮正则应能编译"))
}

/// 收件地址格式校验
pub fn is_valid_email(address: &str) -> bool {
    email_regex().is_match(address.trim())
}

/// CC 地址规则：非占位、含 @、且与收件人不同才加入
pub fn cc_address(cc: Option<&str>, recipient: &str) -> Option<String> {
    let cc = cc?.trim().to_lowercase();
    if CC_PLACEHOLDERS.contains(&cc.as_str()) {
        return None;
    }
    if !cc.contains('@') || cc == recipient.trim().to_lowercase() {
        return None;
    }
    Some(cc)
}

/// 文件名净化：非文字字符一律换成底线
pub fn safe_file_name(name: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[^\w\-]").expect("文件名正则应能编译"));
    re.replace_all(name.trim(), "_").into_owned()
}

/// 下载文件名：按学生或学校命名，带当天日期
pub fn worksheet_file_name(
    school: &str,
    level: &str,
    student: Option<&str>,
    ext: &str,
) -> String {
    let date = chrono::Local::now().date_naive();
    match student {
        Some(name) => format!("{}_{}_{}.{}", name, level, date, ext),
        None => format!("{}_{}_{}.{}", school, level, date, ext),
    }
}

/// 发送服务
pub struct DistributionService<M: MailClient> {
    mail: M,
}

impl<M: MailClient> DistributionService<M> {
    pub fn new(mail: M) -> Self {
        Self { mail }
    }

    /// 把一份 PDF 工作纸寄给一位学生的家长
    ///
    /// 收件地址无效时返回错误，由调用方跳过该学生继续处理其他人。
    pub async fn send_worksheet(
        &self,
        student: &StudentRow,
        school: &str,
        level: &str,
        pdf: Vec<u8>,
    ) -> Result<()> {
        let recipient = student.parent_email.trim();
        if !is_valid_email(recipient) {
            return Err(AppError::invalid_recipient(recipient).into());
        }

        let mail = OutboundMail {
            to: recipient.to_string(),
            cc: cc_address(student.teacher_email.as_deref(), recipient),
            subject: format!(
                "【工作紙】{} ({}) - {} 的校本填充練習",
                school, level, student.name
            ),
            html_body: build_body(&student.name, school, level),
            attachment_name: format!("{}_Worksheet.pdf", safe_file_name(&student.name)),
            attachment: pdf,
        };

        self.mail.send(&mail).await?;
        info!("✓ 已寄出给 {} ({})", student.name, recipient);
        Ok(())
    }
}

fn build_body(student_name: &str, school: &str, level: &str) -> String {
    format!(
        r#"<p>親愛的家長您好：</p>
<p>附件為 <strong>{}</strong> 同學在 <strong>{} ({})</strong> 的校本填充工作紙。</p>
<p>請下載並列印供同學練習。祝 學習愉快！</p>
<br><p>-- 自動發送系統 --</p>"#,
        student_name, school, level
    )
}
