//! Catalogue of named, ready-made patterns.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use PresetCategory::{Bracket, Ignore, Question, Score, Underline};

/// Preset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    /// Leading numbering tokens
    Question,
    /// Score annotations
    Score,
    /// Bracketed spans
    Bracket,
    /// Fill-in blanks
    Underline,
    /// Instruction lines to leave out of the outline
    Ignore,
}

impl PresetCategory {
    /// All categories in display order.
    pub const ALL: [PresetCategory; 5] = [
        PresetCategory::Question,
        PresetCategory::Score,
        PresetCategory::Bracket,
        PresetCategory::Underline,
        PresetCategory::Ignore,
    ];
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresetCategory::Question => "question",
            PresetCategory::Score => "score",
            PresetCategory::Bracket => "bracket",
            PresetCategory::Underline => "underline",
            PresetCategory::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

impl FromStr for PresetCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PresetCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset category: {}", s))
    }
}

/// How a preset's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    /// Regular expression
    Regex,
    /// Literal keyword
    Keyword,
}

/// A named pattern with sample matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Stable identifier
    pub id: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Pattern text
    pub pattern: &'static str,
    /// Pattern interpretation
    pub kind: PresetKind,
    /// Strings the pattern is meant to match
    pub examples: &'static [&'static str],
    /// Category
    pub category: PresetCategory,
}

impl Preset {
    /// Pattern as a regular expression source.
    pub fn regex_source(&self) -> String {
        match self.kind {
            PresetKind::Regex => self.pattern.to_string(),
            PresetKind::Keyword => regex::escape(self.pattern),
        }
    }
}

const fn regex_preset(
    id: &'static str,
    label: &'static str,
    pattern: &'static str,
    examples: &'static [&'static str],
    category: PresetCategory,
) -> Preset {
    Preset {
        id,
        label,
        pattern,
        kind: PresetKind::Regex,
        examples,
        category,
    }
}

static PRESETS: &[Preset] = &[
    regex_preset("chinese_dun", "中文数字+顿号", r"^[一二三四五六七八九十百]+[、]", &["一、", "二、", "十一、"], Question),
    regex_preset("chinese_dot", "中文数字+点号", r"^[一二三四五六七八九十百]+[．.]", &["一．", "三.", "十．"], Question),
    regex_preset("arabic_dun", "阿拉伯数字+顿号", r"^[0-9]+[、]", &["1、", "2、", "10、"], Question),
    regex_preset("arabic_dot", "阿拉伯数字+点号", r"^[0-9]+[.．]", &["1.", "3．", "10."], Question),
    regex_preset("arabic_paren_half", "阿拉伯数字+半角括号", r"^[(][0-9]+[)]", &["(1)", "(2)", "(10)"], Question),
    regex_preset("arabic_paren_full", "阿拉伯数字+全角括号", r"^[（][0-9]+[）]", &["（1）", "（2）", "（10）"], Question),
    regex_preset("circle_number", "圈数字", r"^[①②③④⑤⑥⑦⑧⑨⑩⑪⑫⑬⑭⑮⑯⑰⑱⑲⑳]", &["①", "②", "⑤"], Question),
    regex_preset("letter_dot", "小写字母+点号", r"^[a-z][.．]", &["a.", "c．", "d."], Question),
    regex_preset("letter_paren", "小写字母+括号", r"^[a-z][)）]", &["a)", "c）", "d)"], Question),
    regex_preset("roman", "罗马数字", r"^[ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩⅪⅫ]+[、．.]*", &["Ⅰ、", "Ⅲ．", "Ⅳ"], Question),
    regex_preset("upper_letter_dot", "大写字母+点号", r"^[A-Z][.．]", &["A.", "C．", "D."], Question),
    regex_preset("upper_letter_paren", "大写字母+括号", r"^[A-Z][)）]", &["A)", "C）", "D)"], Question),
    regex_preset("score_bracket", "括号内分数", r"[（(【\[]\s*([0-9]+)\s*分\s*[)）\]】]", &["(5分)", "（10分）", "【10分】"], Score),
    regex_preset("score_total", "共X分格式", r"共\s*([0-9]+)\s*分", &["共5分", "共 15 分"], Score),
    regex_preset("score_simple", "简单分数", r"([0-9]+)\s*分", &["5分", "15 分"], Score),
    regex_preset("score_each", "每小题X分", r"每小题\s*([0-9]+)\s*分", &["每小题2分", "每小题 3 分"], Score),
    regex_preset("bracket_round", "圆括号", r"[（(][^)）]*[)）]", &["(答案)", "（内容）"], Bracket),
    regex_preset("bracket_square", "方括号", r"[【\[][^\]】]*[\]】]", &["[答案]", "【内容】"], Bracket),
    regex_preset("bracket_curly", "花括号", r"\{[^}]*\}", &["{答案}"], Bracket),
    regex_preset("underline_underscore", "下划线", r"_{2,}", &["____"], Underline),
    regex_preset("underline_dash", "破折号", r"—{2,}", &["————"], Underline),
    regex_preset("underline_fullwidth", "全角下划线", r"＿{2,}", &["＿＿＿＿"], Underline),
    regex_preset("ignore_answer_card", "答题卡相关说明", r"答案.*答题卡", &["试题的答案书写在答题卡上"], Ignore),
    regex_preset("ignore_no_write_on_paper", "禁止在试卷作答", r"不得在试题卷上.*作答", &["不得在试题卷上直接作答"], Ignore),
    Preset {
        id: "ignore_attention",
        label: "注意事项标题",
        pattern: "注意事项",
        kind: PresetKind::Keyword,
        examples: &["注意事项", "注意事项："],
        category: Ignore,
    },
    regex_preset("ignore_read_before", "作答前阅读提示", r"作答前.*阅读", &["作答前认真阅读答题卡上的注意事项"], Ignore),
    regex_preset("ignore_exam_end", "考试结束说明", r"考试结束.*监考", &["考试结束，由监考人员将试题卷和答题卡一并收回"], Ignore),
    regex_preset("ignore_exam_time", "考试时间说明", r"考试时间.*分钟", &["考试时间60分钟"], Ignore),
    regex_preset("ignore_total_score", "满分说明", r"满分.*分", &["满分100分"], Ignore),
    regex_preset("ignore_atomic_mass_hint", "相对原子质量提示", r"可能用到.*相对原子质量", &["可能用到的相对原子质量"], Ignore),
    regex_preset("ignore_relative_atomic_mass", "相对原子质量数据", r"^[A-Z][a-z]?[：:=-]\s*[0-9]+", &["H-1", "C:12", "Na：23"], Ignore),
    regex_preset("ignore_answer_sheet_fill", "答题卡填涂提示", r"填涂.*答题卡", &["用2B铅笔填涂答题卡"], Ignore),
];

/// Every preset.
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Presets of one category, in catalogue order.
pub fn presets(category: PresetCategory) -> Vec<&'static Preset> {
    PRESETS.iter().filter(|p| p.category == category).collect()
}

/// Find the preset whose pattern text equals the given string.
pub fn find_by_regex(pattern: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.pattern == pattern)
}

/// Find a preset by id.
pub fn find_by_id(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}
