//! Integration tests for outline inference.

use unexam::model::Question;
use unexam::rules::{LevelRule, Pattern, RuleConfig};
use unexam::{extract_outline, ExtractOptions, OutlineExtractor, RuleSet, StyledRun};

fn exam_runs() -> Vec<StyledRun> {
    vec![
        StyledRun::new("一、选择题（共30分）", 16.0, true, 0),
        StyledRun::new("1. 下列说法正确的是（3分）", 12.0, false, 1),
        StyledRun::new("（1）第一小问", 12.0, false, 2),
        StyledRun::new("2. 第二题", 12.0, false, 3),
        StyledRun::new("二、填空题", 16.0, true, 4),
        StyledRun::new("请将答案写在横线上", 12.0, false, 5),
    ]
}

fn assert_strict_nesting(questions: &[Question]) {
    for q in questions {
        for child in &q.children {
            assert!(child.level > q.level, "{} nested under {}", child.number, q.number);
            assert!(child.source_order > q.source_order);
        }
        assert_strict_nesting(&q.children);
    }
}

#[test]
fn test_exam_outline() {
    let outline = extract_outline(&exam_runs(), &RuleSet::default());

    assert_eq!(outline.questions.len(), 2);
    let first = &outline.questions[0];
    assert_eq!(first.number, "一、");
    assert_eq!(first.body, "选择题（共30分）");
    assert_eq!(first.level, 1);
    assert_eq!(first.score, Some(30));

    assert_eq!(first.children.len(), 2);
    let q1 = &first.children[0];
    assert_eq!((q1.level, q1.number.as_str()), (2, "1."));
    assert_eq!(q1.score, Some(3));
    assert_eq!(q1.children.len(), 1);
    assert_eq!(q1.children[0].level, 3);
    assert_eq!(q1.children[0].number, "（1）");

    assert_eq!(first.children[1].number, "2.");
    assert!(outline.questions[1].is_leaf());
    assert_eq!(outline.question_count(), 5);
    assert_strict_nesting(&outline.questions);
}

#[test]
fn test_level_summary() {
    let outline = extract_outline(&exam_runs(), &RuleSet::default());

    assert_eq!(outline.levels.len(), 2);
    assert_eq!(outline.levels[0].label, "bold 16pt");
    assert_eq!(outline.levels[0].base_level, Some(1));
    assert_eq!(outline.levels[1].base_level, Some(2));
    assert_eq!(outline.levels[1].sub_levels, 2);
    assert_eq!(outline.levels[1].run_count, 4);

    let mapping = outline.level_mapping();
    assert_eq!(mapping.get("12pt"), Some(&(2, 2)));
}

#[test]
fn test_unnumbered_group_consumes_no_level() {
    let mut runs = exam_runs();
    runs.push(StyledRun::new("2024年期末考试", 22.0, true, 6));

    let outline = extract_outline(&runs, &RuleSet::default());
    assert_eq!(outline.levels[0].label, "bold 22pt");
    assert_eq!(outline.levels[0].base_level, None);
    assert_eq!(outline.questions[0].level, 1);
    assert_eq!(outline.questions[0].children[0].level, 2);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut shuffled = exam_runs();
    shuffled.reverse();
    shuffled.swap(1, 4);

    let rules = RuleSet::default();
    assert_eq!(extract_outline(&shuffled, &rules), extract_outline(&exam_runs(), &rules));
}

#[test]
fn test_deterministic() {
    let extractor = OutlineExtractor::default();
    let a = extractor.extract(&exam_runs());
    let b = extractor.extract(&exam_runs());
    assert_eq!(a, b);
}

#[test]
fn test_empty_and_blank_input() {
    let rules = RuleSet::default();
    assert!(extract_outline(&[], &rules).is_empty());

    let blanks = vec![StyledRun::new("   ", 12.0, false, 0), StyledRun::new("", 14.0, true, 1)];
    let outline = extract_outline(&blanks, &rules);
    assert!(outline.is_empty());
    assert!(outline.levels.is_empty());
}

#[test]
fn test_missing_style_uses_defaults() {
    let runs = vec![
        StyledRun::from_style("一、阅读", None, None, 0),
        StyledRun::from_style("1. 问题", Some(10.5), Some(false), 1),
    ];
    let outline = extract_outline(&runs, &RuleSet::default());

    // Same signature, so both patterns share one group with two sub-levels.
    assert_eq!(outline.levels.len(), 1);
    assert_eq!(outline.questions[0].level, 1);
    assert_eq!(outline.questions[0].children[0].level, 2);
}

#[test]
fn test_first_pattern_wins() {
    let rules = RuleSet::compile(&[r"\d+", r"\d+\."]);
    let m = rules.match_leading("12. text").unwrap();
    assert_eq!(m.pattern_index, 0);
    assert_eq!(m.number, "12");
    assert_eq!(m.remainder, ". text");
}

#[test]
fn test_configured_rules() {
    let config = RuleConfig {
        levels: vec![
            LevelRule::new("part", vec![r"^Part\s+\d+".to_string()]),
            LevelRule::new("item", vec![r"^\d+\)".to_string()])
                .with_score_patterns(vec![r"\[(\d+)\]".to_string()]),
        ],
        ignore: vec!["^Note".to_string()],
        ..Default::default()
    };
    let rules = RuleSet::from_config(&config);

    let runs = vec![
        StyledRun::new("Note: 1) read carefully", 12.0, false, 0),
        StyledRun::new("Part 1 Listening", 14.0, true, 1),
        StyledRun::new("1) First item [4]", 12.0, false, 2),
        StyledRun::new("2) Second item 5分", 12.0, false, 3),
    ];
    let outline = extract_outline(&runs, &rules);

    assert_eq!(outline.questions.len(), 1);
    let part = &outline.questions[0];
    assert_eq!(part.children.len(), 2);
    assert_eq!(part.children[0].score, Some(4));
    assert_eq!(part.children[1].score, None);
}

#[test]
fn test_options() {
    let runs = exam_runs();

    let no_scores = OutlineExtractor::new(RuleSet::default())
        .with_options(ExtractOptions::new().with_scores(false))
        .extract(&runs);
    assert!(no_scores.iter().all(|q| q.score.is_none()));

    let shallow = OutlineExtractor::new(RuleSet::default())
        .with_options(ExtractOptions::new().with_max_level(2))
        .extract(&runs);
    assert_eq!(shallow.question_count(), 4);
}

#[test]
fn test_invalid_patterns_dropped() {
    let patterns = Pattern::compile_all(&["([", r"^\d+\."]);
    assert_eq!(patterns.len(), 1);

    let config = RuleConfig {
        levels: vec![LevelRule::new("broken", vec!["([".to_string()])],
        ..Default::default()
    };
    let rules = RuleSet::from_config(&config);
    assert!(rules.numbering().is_empty());
    assert!(extract_outline(&exam_runs(), &rules).is_empty());
}
