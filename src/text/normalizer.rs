//! 文本清理工具
//!
//! 纯函数，不会失败：修复空格与大小写粘连，按句子重新分段。

use once_cell::sync::Lazy;
use regex::Regex;

static RE_LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static RE_PUNCT_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])([A-Z])").unwrap());
static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]{2,}").unwrap());
static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());
static RE_ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 每段包含的句子数
const SENTENCES_PER_PARAGRAPH: usize = 4;

/// 清理文本中的空格和换行
///
/// - 小写字母后紧跟大写字母时补空格（`wordWord` → `word Word`）
/// - 句末标点后紧跟大写字母时补空格
/// - 连续空白压缩为一个空格
/// - 3 个以上连续换行压缩为一个空行
/// - 去掉每行首尾空白
pub fn cleanup(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = RE_LOWER_UPPER.replace_all(&text, "$1 $2");
    let text = RE_PUNCT_UPPER.replace_all(&text, "$1 $2");
    let text = RE_HORIZONTAL_WS.replace_all(&text, " ");

    let trimmed_lines = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    RE_EXCESS_NEWLINES
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

/// 按句子重新分段，每 4 句一段，段落之间以空行分隔
pub fn paragraphize(passage: &str) -> String {
    let sentences = split_sentences(passage);
    if sentences.is_empty() {
        return passage.trim().to_string();
    }

    sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|chunk| chunk.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 拆分句子；末尾没有句末标点的残句作为最后一句保留
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut consumed = 0;

    for m in RE_SENTENCE.find_iter(text) {
        push_sentence(&mut sentences, m.as_str());
        consumed = m.end();
    }
    push_sentence(&mut sentences, &text[consumed..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = RE_ANY_WS.replace_all(raw.trim(), " ");
    if !sentence.is_empty() {
        sentences.push(sentence.into_owned());
    }
}
