//! Plain text rendering for question outlines.

use crate::model::Question;

/// Render a question forest as indented text.
///
/// Each line reads `[L{level}] {number} {body}`, followed by `(N分)` when
/// a score was found. Children are indented two spaces per depth.
pub fn outline_to_text(questions: &[Question]) -> String {
    let mut output = String::new();
    for question in questions {
        render_question(&mut output, question, 0);
    }
    output.trim_end().to_string()
}

fn render_question(output: &mut String, question: &Question, depth: usize) {
    output.push_str(&"  ".repeat(depth));
    output.push_str(&format!("[L{}] {}", question.level, question.number));
    if !question.body.is_empty() {
        output.push(' ');
        output.push_str(&question.body);
    }
    if let Some(score) = question.score {
        output.push_str(&format!(" ({}分)", score));
    }
    output.push('\n');

    for child in &question.children {
        render_question(output, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_to_text() {
        let mut root = Question::new(1, "一、", "选择题", 0).with_score(Some(30));
        root.add_child(Question::new(2, "1.", "下列说法正确的是", 1));

        let text = outline_to_text(&[root]);
        assert_eq!(text, "[L1] 一、 选择题 (30分)\n  [L2] 1. 下列说法正确的是");
    }

    #[test]
    fn test_empty_outline() {
        assert_eq!(outline_to_text(&[]), "");
    }
}
