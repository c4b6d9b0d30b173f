use std::sync::Mutex;

use anyhow::Result;
use worksheet_admin::clients::mail::{MailClient, OutboundMail};
use worksheet_admin::clients::sheets::{CellUpdate, SheetStore};
use worksheet_admin::config::{Config, DeliveryMode};
use worksheet_admin::logger;
use worksheet_admin::services::{DistributionService, ReviewService, StudentService};
use worksheet_admin::workflow::{BatchCtx, BatchOutcome, WorksheetFlow};

/// 内存表格：Review 与 學生資料 两张工作表，记录全部写回
struct MemoryStore {
    review: Vec<Vec<String>>,
    students: Vec<Vec<String>>,
    updates: Mutex<Vec<(String, CellUpdate)>>,
}

impl SheetStore for &MemoryStore {
    async fn fetch_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        if sheet == "Review" {
            Ok(self.review.clone())
        } else {
            Ok(self.students.clone())
        }
    }

    async fn batch_update(&self, sheet: &str, updates: &[CellUpdate]) -> Result<()> {
        let mut guard = self.updates.lock().unwrap();
        for u in updates {
            guard.push((sheet.to_string(), u.clone()));
        }
        Ok(())
    }
}

/// 只记录不真正发送的邮件客户端
#[derive(Default)]
struct RecordingMail {
    sent: Mutex<Vec<OutboundMail>>,
}

impl MailClient for &RecordingMail {
    async fn send(&self, mail: &OutboundMail) -> Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

fn review_table() -> Vec<Vec<String>> {
    let header = vec!["Timestamp", "學校", "年級", "詞語", "句子", "來源", "狀態"];
    let rows = vec![
        vec!["t1", "培正小學", "小三", "定期", "小明〖定期〗檢查牙齒。", "DB", "Ready"],
        vec!["t2", "培正小學", "小三", "香港", "他住在【香港】。", "DB", "Ready"],
        vec!["t3", "培正小學", "小三", "快樂", "她已寄出〖快樂〗。", "DB", "Sent"],
    ];
    std::iter::once(header)
        .chain(rows)
        .map(|r| r.into_iter().map(str::to_string).collect())
        .collect()
}

fn student_table(parent_emails: &[&str]) -> Vec<Vec<String>> {
    let header: Vec<String> = ["學校", "年級", "狀態", "學生姓名", "家長 Email", "老師 Email"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut table = vec![header];
    for (i, email) in parent_emails.iter().enumerate() {
        table.push(vec![
            "培正小學".to_string(),
            "小三".to_string(),
            "Y".to_string(),
            format!("學生{}", i + 1),
            email.to_string(),
            "N/A".to_string(),
        ]);
    }
    table
}

fn email_config() -> Config {
    Config {
        delivery_mode: DeliveryMode::Email,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_email_flow_end_to_end() {
    logger::init();

    let store = MemoryStore {
        review: review_table(),
        students: student_table(&["chan@example.com", "wong@example.com"]),
        updates: Mutex::new(Vec::new()),
    };
    let mail = RecordingMail::default();

    let config = email_config();
    let review = ReviewService::new(&store, &config);
    let students = StudentService::new(&store, &config);
    let distribution = DistributionService::new(&mail);
    let flow = WorksheetFlow::new(&review, &students, &distribution, &config);

    let rows = review.list_pending(None).await.expect("读取审核表失败");
    // 已 Sent 的 t3 不进入批次
    assert_eq!(rows.len(), 2);

    let ctx = BatchCtx::new("培正小學", "小三");
    let outcome = flow.run(&ctx, &rows).await.expect("批次处理失败");
    assert_eq!(
        outcome,
        BatchOutcome::Sent {
            delivered: 2,
            skipped: 0
        }
    );

    // 两位家长各收到一封，附件是 PDF 字节
    let sent = mail.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("培正小學"));
    assert!(sent[0].attachment.starts_with(b"%PDF"));
    // N/A 的老師 Email 被静默忽略
    assert!(sent.iter().all(|m| m.cc.is_none()));

    // 状态先 Loaded 后 Sent，各写两行
    let updates = store.updates.lock().unwrap();
    let loaded: Vec<_> = updates
        .iter()
        .filter(|(_, u)| u.value == "Loaded")
        .collect();
    let sent_marks: Vec<_> = updates.iter().filter(|(_, u)| u.value == "Sent").collect();
    assert_eq!(loaded.len(), 2);
    assert_eq!(sent_marks.len(), 2);
}

#[tokio::test]
async fn test_email_flow_invalid_address_blocks_sent_mark() {
    logger::init();

    let store = MemoryStore {
        review: review_table(),
        students: student_table(&["chan@example.com", "not-an-email"]),
        updates: Mutex::new(Vec::new()),
    };
    let mail = RecordingMail::default();

    let config = email_config();
    let review = ReviewService::new(&store, &config);
    let students = StudentService::new(&store, &config);
    let distribution = DistributionService::new(&mail);
    let flow = WorksheetFlow::new(&review, &students, &distribution, &config);

    let rows = review.list_pending(None).await.unwrap();
    let ctx = BatchCtx::new("培正小學", "小三");
    let outcome = flow.run(&ctx, &rows).await.unwrap();

    // 无效地址被跳过，其余学生照常寄出
    assert_eq!(
        outcome,
        BatchOutcome::Sent {
            delivered: 1,
            skipped: 1
        }
    );
    assert_eq!(mail.sent.lock().unwrap().len(), 1);

    // 未全员寄出，不得标记 Sent
    let updates = store.updates.lock().unwrap();
    assert!(updates.iter().all(|(_, u)| u.value != "Sent"));
}

#[tokio::test]
async fn test_download_flow_writes_files() {
    logger::init();

    let out_dir = std::env::temp_dir().join(format!("worksheet_admin_it_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&out_dir);

    let store = MemoryStore {
        review: review_table(),
        students: student_table(&[]),
        updates: Mutex::new(Vec::new()),
    };
    let mail = RecordingMail::default();

    let config = Config {
        delivery_mode: DeliveryMode::Download,
        output_dir: out_dir.to_string_lossy().into_owned(),
        ..Config::default()
    };
    let review = ReviewService::new(&store, &config);
    let students = StudentService::new(&store, &config);
    let distribution = DistributionService::new(&mail);
    let flow = WorksheetFlow::new(&review, &students, &distribution, &config);

    let rows = review.list_pending(None).await.unwrap();
    let ctx = BatchCtx::new("培正小學", "小三");
    let outcome = flow.run(&ctx, &rows).await.unwrap();

    match outcome {
        BatchOutcome::Downloaded { files } => {
            assert_eq!(files.len(), 3);
            assert!(files.iter().any(|f| f.ends_with(".fodt")));
            for f in &files {
                assert!(std::path::Path::new(f).exists(), "缺少输出文件 {}", f);
            }
        }
        other => panic!("应为 Downloaded，得到 {:?}", other),
    }

    // 下载模式生成后立即标记 Sent
    let updates = store.updates.lock().unwrap();
    assert!(updates.iter().any(|(_, u)| u.value == "Sent"));

    let _ = std::fs::remove_dir_all(&out_dir);
}

#[tokio::test]
async fn test_pending_batch_is_skipped() {
    logger::init();

    let mut review_rows = review_table();
    review_rows.push(
        vec!["t4", "培正小學", "小三", "努力", "＊大家都很〖努力〗。", "AI", "Pending"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    let store = MemoryStore {
        review: review_rows,
        students: student_table(&["chan@example.com"]),
        updates: Mutex::new(Vec::new()),
    };
    let mail = RecordingMail::default();

    let config = email_config();
    let review = ReviewService::new(&store, &config);
    let students = StudentService::new(&store, &config);
    let distribution = DistributionService::new(&mail);
    let flow = WorksheetFlow::new(&review, &students, &distribution, &config);

    let rows = review.list_pending(None).await.unwrap();
    let ctx = BatchCtx::new("培正小學", "小三");
    let outcome = flow.run(&ctx, &rows).await.unwrap();

    assert!(matches!(outcome, BatchOutcome::Skipped { .. }));
    assert!(mail.sent.lock().unwrap().is_empty());
    assert!(store.updates.lock().unwrap().is_empty());
}

/// 连接真实试算表（需要凭证，默认忽略：cargo test -- --ignored）
#[tokio::test]
#[ignore]
async fn test_live_sheets_connection() {
    logger::init();

    let config = Config::from_env();
    config.require_credentials().expect("缺少试算表凭证");

    let client = worksheet_admin::clients::sheets::GoogleSheetsClient::new(&config);
    let review = ReviewService::new(client, &config);
    let rows = review.load_review().await.expect("读取 Review 表失败");
    println!("找到 {} 行审核资料", rows.len());
}

/// 真实寄送一封测试邮件（需要凭证，默认忽略）
#[tokio::test]
#[ignore]
async fn test_live_mail_send() {
    logger::init();

    let config = Config::from_env();
    let client = worksheet_admin::clients::mail::SendGridClient::new(&config);
    let mail = OutboundMail {
        to: config.from_email.clone(),
        cc: None,
        subject: "【工作紙】寄送测试".to_string(),
        html_body: "<p>测试邮件</p>".to_string(),
        attachment_name: "test_Worksheet.pdf".to_string(),
        attachment: vec![0x25, 0x50, 0x44, 0x46],
    };
    client.send(&mail).await.expect("寄送失败");
}
