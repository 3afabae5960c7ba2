//! Book Context - Value Objects

use serde::{Deserialize, Serialize};

use super::BookError;

/// 书名最大字符数
pub const MAX_TITLE_CHARS: usize = 200;

/// 新建书籍的默认状态
pub const DEFAULT_BOOK_STATUS: &str = "ongoing";

/// 新建章节的默认状态
pub const DEFAULT_CHAPTER_STATUS: &str = "draft";

/// 书名
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 不超过 200 个字符（按 char 计，兼容中文）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, BookError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BookError::InvalidTitle("标题不能为空".to_string()));
        }
        if trimmed.chars().count() > MAX_TITLE_CHARS {
            return Err(BookError::InvalidTitle(format!(
                "标题长度不能超过{}字符",
                MAX_TITLE_CHARS
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 副本书名：原书名 + 后缀
    ///
    /// 副本名不再受长度限制，避免恢复接近上限的书名时失败
    pub fn copy_of(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 统计章节字数
///
/// 富文本内容中的标签不计入，空白（含全角空格）不计入
pub fn count_words(content: &str) -> i64 {
    let mut in_tag = false;
    let mut count = 0_i64;

    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag || ch.is_whitespace() => {}
            _ => count += 1,
        }
    }

    count
}
