//! 稿件切分与渲染
//!
//! - 纯文本稿件按章节标题行切分为章节，正文按行包装为段落
//! - 有序的卷/章节渲染为独立的 HTML 文档（供文字处理格式转换使用）

use crate::domain::book::count_words;

/// 标题行的最大字符数，超过则视为正文
pub const MAX_HEADING_CHARS: usize = 50;

/// 第一个标题之前的文本归入的章节名
pub const PROLOGUE_TITLE: &str = "序章 / 前言";

/// 段首缩进（两个全角空格）
const PARAGRAPH_INDENT: &str = "\u{3000}\u{3000}";

/// 内容为空的章节在渲染时的占位
const EMPTY_CHAPTER_PLACEHOLDER: &str = "<p>（暂无内容）</p>";

/// 切分出的章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManuscriptChapter {
    pub title: String,
    pub content: String,
    pub word_count: i64,
}

impl ManuscriptChapter {
    fn from_lines(title: String, lines: &[&str]) -> Self {
        let content = format_paragraphs(lines);
        let word_count = count_words(&content);
        Self {
            title,
            content,
            word_count,
        }
    }
}

/// 渲染用的卷
#[derive(Debug, Clone)]
pub struct ManuscriptVolume {
    pub title: String,
    /// (章节标题, 章节富文本内容)
    pub chapters: Vec<(String, String)>,
}

/// 中文数字或阿拉伯数字
#[inline]
fn is_numeral(ch: char) -> bool {
    ch.is_ascii_digit()
        || matches!(
            ch,
            '零' | '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '十' | '百' | '千' | '万' | '两'
        )
}

/// 「第…章 / 卷 / 节」
fn is_cjk_heading(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('第') else {
        return false;
    };
    let digits = rest.chars().take_while(|c| is_numeral(*c)).count();
    if digits == 0 {
        return false;
    }
    matches!(rest.chars().nth(digits), Some('章' | '卷' | '节'))
}

/// 「Chapter 12」/「CHAPTER 12: ...」
fn is_latin_heading(line: &str) -> bool {
    let Some(rest) = line
        .strip_prefix("Chapter ")
        .or_else(|| line.strip_prefix("CHAPTER "))
    else {
        return false;
    };
    rest.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// 判断一行是否为章节标题
pub fn is_chapter_heading(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.chars().count() >= MAX_HEADING_CHARS {
        return false;
    }
    is_cjk_heading(line) || is_latin_heading(line)
}

/// 正文行包装为段落：去空白、丢弃空行、加段首缩进
fn format_paragraphs(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}{}</p>", PARAGRAPH_INDENT, escape_html(line)))
        .collect()
}

/// 按章节标题切分纯文本稿件
///
/// 切分策略:
/// 1. 按行扫描（支持 \n 和 \r\n）
/// 2. 标题行开启新章节，标题行本身作为章节名
/// 3. 第一个标题之前的非空文本作为序章
/// 4. 没有任何标题时，整篇作为一个序章
pub fn split_chapters(text: &str) -> Vec<ManuscriptChapter> {
    let mut chapters = Vec::new();
    let mut current_title: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if is_chapter_heading(line) {
            match current_title.take() {
                Some(title) => chapters.push(ManuscriptChapter::from_lines(title, &body)),
                None if body.iter().any(|l| !l.trim().is_empty()) => chapters.push(
                    ManuscriptChapter::from_lines(PROLOGUE_TITLE.to_string(), &body),
                ),
                None => {}
            }
            body.clear();
            current_title = Some(line.trim().to_string());
        } else {
            body.push(line);
        }
    }

    match current_title {
        Some(title) => chapters.push(ManuscriptChapter::from_lines(title, &body)),
        None if body.iter().any(|l| !l.trim().is_empty()) => chapters.push(
            ManuscriptChapter::from_lines(PROLOGUE_TITLE.to_string(), &body),
        ),
        None => {}
    }

    chapters
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 渲染整书 HTML
///
/// 卷标题为 `<h1>`（分页），章节标题为 `<h2>`；章节内容已是富文本，原样嵌入
pub fn render_manuscript_html(book_title: &str, volumes: &[ManuscriptVolume]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
         body { font-family: 'Songti SC', 'SimSun', serif; }\n\
         h1 { text-align: center; page-break-before: always; font-size: 24pt; }\n\
         h2 { font-size: 18pt; margin-top: 20px; }\n\
         p { text-indent: 2em; line-height: 1.5; margin-bottom: 10px; }\n\
         </style>\n</head>\n<body>\n",
    );

    html.push_str(&format!(
        "<div class=\"cover\"><h1 style=\"font-size: 36pt;\">{}</h1></div>\n",
        escape_html(book_title)
    ));

    for volume in volumes {
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&volume.title)));
        for (title, content) in &volume.chapters {
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(title)));
            if content.trim().is_empty() {
                html.push_str(EMPTY_CHAPTER_PLACEHOLDER);
            } else {
                html.push_str(content);
            }
            html.push('\n');
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_detection() {
        assert!(is_chapter_heading("第一章 风起"));
        assert!(is_chapter_heading("  第12节"));
        assert!(is_chapter_heading("第三卷：归途"));
        assert!(is_chapter_heading("Chapter 3: The Gate"));
        assert!(!is_chapter_heading("第一次见到他的时候，天已经黑了。"));
        assert!(!is_chapter_heading("Chapter and verse"));
        assert!(!is_chapter_heading(""));
    }

    #[test]
    fn test_long_heading_is_body() {
        let line = format!("第一章{}", "长".repeat(MAX_HEADING_CHARS));
        assert!(!is_chapter_heading(&line));
    }

    #[test]
    fn test_split_with_prologue() {
        let text = "楔子内容。\n\n第一章 风起\n城门关了。\n\n第二章 夜行\n他走了。\r\n";
        let chapters = split_chapters(text);

        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title, PROLOGUE_TITLE);
        assert_eq!(chapters[1].title, "第一章 风起");
        assert_eq!(chapters[1].content, "<p>\u{3000}\u{3000}城门关了。</p>");
        assert_eq!(chapters[1].word_count, 5);
        assert_eq!(chapters[2].title, "第二章 夜行");
    }

    #[test]
    fn test_split_without_headings() {
        let chapters = split_chapters("只有一段。\n另一段。");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, PROLOGUE_TITLE);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_chapters("  \n\n ").is_empty());
    }

    #[test]
    fn test_body_is_escaped() {
        let chapters = split_chapters("第一章\na < b & c");
        assert_eq!(
            chapters[0].content,
            "<p>\u{3000}\u{3000}a &lt; b &amp; c</p>"
        );
    }

    #[test]
    fn test_render_orders_and_placeholders() {
        let volumes = vec![ManuscriptVolume {
            title: "第一卷".to_string(),
            chapters: vec![
                ("第一章".to_string(), "<p>甲</p>".to_string()),
                ("第二章".to_string(), String::new()),
            ],
        }];
        let html = render_manuscript_html("长夜 & 黎明", &volumes);

        assert!(html.contains("长夜 &amp; 黎明"));
        let first = html.find("<h2>第一章</h2>").unwrap();
        let second = html.find("<h2>第二章</h2>").unwrap();
        assert!(first < second);
        assert!(html.contains(EMPTY_CHAPTER_PLACEHOLDER));
    }
}
