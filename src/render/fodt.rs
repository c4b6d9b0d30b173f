//! 平面 ODT（.fodt）导出
//!
//! 次要格式：单文件 XML，可在文书软件中直接打开修改。
//! 与 PDF 共用同一套 token 呈现规则：专名号加底线（T1），
//! 教师版答案红字（T2），学生版挖空为全角底线。

use crate::layout::{blank_text, tokenize, Token};
use crate::models::Question;
use crate::render::worksheet::Variant;

/// XML 文字转义
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// 把一条句子转成段落内的 span 序列
fn sentence_spans(content: &str, variant: Variant) -> String {
    let mut out = String::new();
    let mut plain_buf = String::new();

    let flush = |buf: &mut String, out: &mut String| {
        if !buf.is_empty() {
            out.push_str(&escape_xml(buf));
            buf.clear();
        }
    };

    for token in tokenize(content) {
        match token {
            Token::Plain(c) => plain_buf.push(c),
            Token::Underline(s) => {
                flush(&mut plain_buf, &mut out);
                out.push_str(&format!(
                    r#"<text:span text:style-name="T1">{}</text:span>"#,
                    escape_xml(&s)
                ));
            }
            Token::Target(s) => {
                flush(&mut plain_buf, &mut out);
                match variant {
                    Variant::Student => out.push_str(&escape_xml(&blank_text(&s))),
                    Variant::AnswerKey => out.push_str(&format!(
                        r#"<text:span text:style-name="T2">{}</text:span>"#,
                        escape_xml(&s)
                    )),
                }
            }
        }
    }
    flush(&mut plain_buf, &mut out);
    out
}

/// 生成整份 .fodt 文档
pub fn build_fodt(
    questions: &[Question],
    variant: Variant,
    title: &str,
    date_label: &str,
) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "    <text:p text:style-name=\"PTitle\">{}</text:p>\n",
        escape_xml(title)
    ));
    body.push_str(&format!(
        "    <text:p text:style-name=\"PBody\">{}</text:p>\n",
        escape_xml(date_label)
    ));

    for (i, question) in questions.iter().enumerate() {
        body.push_str(&format!(
            "    <text:p text:style-name=\"PBody\">{}. {}</text:p>\n",
            i + 1,
            sentence_spans(&question.content, variant)
        ));
    }

    if variant == Variant::Student && !questions.is_empty() {
        body.push_str("    <text:p text:style-name=\"PHeading\">詞語表</text:p>\n");
        // 两个词语一行，全角空格分隔
        for (row, pair) in questions.chunks(2).enumerate() {
            let mut line = String::new();
            for (offset, question) in pair.iter().enumerate() {
                if offset > 0 {
                    line.push_str("　　");
                }
                line.push_str(&format!(
                    "{}. {}",
                    row * 2 + offset + 1,
                    escape_xml(&question.word)
                ));
            }
            body.push_str(&format!(
                "    <text:p text:style-name=\"PBody\">{}</text:p>\n",
                line
            ));
        }
    }

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
 xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
 xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
 xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"
 office:version="1.2" office:mimetype="application/vnd.oasis.opendocument.text">
 <office:automatic-styles>
  <style:style style:name="PTitle" style:family="paragraph">
   <style:paragraph-properties fo:text-align="center"/>
   <style:text-properties fo:font-size="20pt" fo:font-weight="bold"/>
  </style:style>
  <style:style style:name="PHeading" style:family="paragraph">
   <style:paragraph-properties fo:text-align="center"/>
   <style:text-properties fo:font-size="16pt" fo:font-weight="bold"/>
  </style:style>
  <style:style style:name="PBody" style:family="paragraph">
   <style:text-properties fo:font-size="14pt"/>
  </style:style>
  <style:style style:name="T1" style:family="text">
   <style:text-properties style:text-underline-style="solid" style:text-underline-width="auto" style:text-underline-color="font-color"/>
  </style:style>
  <style:style style:name="T2" style:family="text">
   <style:text-properties fo:color="#c00000"/>
  </style:style>
 </office:automatic-styles>
 <office:body>
  <office:text>
{}  </office:text>
 </office:body>
</office:document>
"##,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
        vec![
            Question::new("定期", "小明〖定期〗檢查牙齒。", "培正小學", "小三"),
            Question::new("香港", "他住在【香港】的〖香港〗島。", "培正小學", "小三"),
            Question::new("努力", "大家都很〖努力〗。", "培正小學", "小三"),
        ]
    }

    #[test]
    fn test_student_fodt_blanks_and_word_list() {
        let doc = build_fodt(
            &questions(),
            Variant::Student,
            "培正小學 (小三) - 校本填充工作紙",
            "日期: 2026-08-06",
        );
        assert!(doc.contains("＿＿＿＿"));
        assert!(doc.contains("詞語表"));
        assert!(doc.contains("1. 定期"));
        // 学生版不出现红字答案
        assert!(!doc.contains("T2\">定期"));
    }

    #[test]
    fn test_answer_key_fodt_colors_targets() {
        let doc = build_fodt(
            &questions(),
            Variant::AnswerKey,
            "培正小學 (小三) - 校本填充工作紙（教師版）",
            "日期: 2026-08-06",
        );
        assert!(doc.contains(r#"<text:span text:style-name="T2">定期</text:span>"#));
        assert!(!doc.contains("＿"));
        assert!(!doc.contains("詞語表"));
    }

    #[test]
    fn test_underline_span_style() {
        let doc = build_fodt(&questions(), Variant::AnswerKey, "t", "d");
        assert!(doc.contains(r#"<text:span text:style-name="T1">香港</text:span>"#));
    }

    #[test]
    fn test_escaped_characters() {
        let q = vec![Question::new(
            "比較",
            "1 < 2 而且 A & B 都要〖比較〗。",
            "校",
            "級",
        )];
        let doc = build_fodt(&q, Variant::AnswerKey, "t", "d");
        assert!(doc.contains("&lt;"));
        assert!(doc.contains("&amp;"));
        assert!(!doc.contains(" < 2"));
    }
}
