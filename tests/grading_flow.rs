mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{graded, provider_failure, ScriptedGrader};
use essay_grader::models::rubric::catalog;
use essay_grader::{Grade, GradingFlow};

fn flow_with(grader: &Arc<ScriptedGrader>) -> GradingFlow {
    GradingFlow::new(grader.clone())
}

#[tokio::test]
async fn test_report_follows_catalog_order() {
    let grader = Arc::new(ScriptedGrader::constant(4));
    let report = flow_with(&grader).grade_essay("I went to the beach.").await;

    let keys: Vec<&str> = report.iter().map(|r| r.dimension).collect();
    assert_eq!(
        keys,
        vec![
            "ideas",
            "organization",
            "voice",
            "word_choice",
            "sentence_fluency",
            "conventions"
        ]
    );
    assert_eq!(grader.calls(), 6);
    assert_eq!(report.ungraded_count(), 0);
}

#[tokio::test]
async fn test_order_independent_of_completion_order() {
    // 目录靠前的维度故意最慢返回
    let grader = Arc::new(
        ScriptedGrader::new(|dimension, _| Ok(graded(dimension.position as u8 % 5 + 1, dimension.key)))
            .with_delay(|dimension| Duration::from_millis((6 - dimension.position as u64) * 15)),
    );

    let report = flow_with(&grader).grade_essay("text").await;

    for (position, result) in report.iter().enumerate() {
        assert_eq!(result.dimension, catalog()[position].key);
        assert_eq!(result.comments, catalog()[position].key);
    }
}

#[tokio::test]
async fn test_empty_essay_still_graded_on_every_dimension() {
    let grader = Arc::new(ScriptedGrader::new(|_, user_message| {
        assert!(user_message.contains("Here is the essay to be graded"));
        Ok(graded(1, "Nothing to assess."))
    }));

    let report = flow_with(&grader).grade_essay("").await;

    assert_eq!(report.len(), 6);
    assert_eq!(grader.calls(), 6);
    assert!(report.iter().all(|r| r.grade.score() == Some(1)));
}

#[tokio::test]
async fn test_one_failing_dimension_is_isolated() {
    let baseline = Arc::new(ScriptedGrader::constant(3));
    let baseline_report = flow_with(&baseline).grade_essay("essay").await;

    let grader = Arc::new(ScriptedGrader::new(|dimension, _| {
        if dimension.key == "voice" {
            Err(provider_failure())
        } else {
            Ok(graded(3, &format!("{} looks fine.", dimension.key)))
        }
    }));
    let report = flow_with(&grader).grade_essay("essay").await;

    assert_eq!(report.len(), 6);
    assert_eq!(report.ungraded_count(), 1);

    let voice = report.get("voice").expect("voice present");
    assert!(matches!(voice.grade, Grade::Ungraded { .. }));
    assert!(voice.comments.starts_with("grading service call failed"));

    for (before, after) in baseline_report.iter().zip(report.iter()) {
        if after.dimension != "voice" {
            assert_eq!(before, after);
        }
    }
}

#[tokio::test]
async fn test_invalid_grades_never_clamped() {
    let responses: HashMap<&str, &str> = HashMap::from([
        ("ideas", r#"{"grade": 6, "comments": "too high"}"#),
        ("organization", r#"{"grade": 0, "comments": "too low"}"#),
        ("voice", r#"{"grade": 3.5, "comments": "half"}"#),
        ("word_choice", r#"{"grade": "4/5", "comments": "ratio"}"#),
        ("sentence_fluency", "The essay deserves a 4."),
        ("conventions", r#"{"grade": 5.0, "comments": "whole float"}"#),
    ]);
    let grader = Arc::new(ScriptedGrader::new(move |dimension, _| {
        Ok(responses[dimension.key].to_string())
    }));

    let report = flow_with(&grader).grade_essay("essay").await;

    assert_eq!(report.ungraded_count(), 5);
    assert_eq!(report.get("conventions").and_then(|r| r.grade.score()), Some(5));
    for result in report.iter() {
        if let Some(score) = result.grade.score() {
            assert!((1..=5).contains(&score));
        }
    }
}

#[tokio::test]
async fn test_grading_is_repeatable() {
    let grader = Arc::new(ScriptedGrader::new(|dimension, _| {
        Ok(graded(dimension.position as u8 % 5 + 1, dimension.key))
    }));
    let flow = flow_with(&grader);

    let first = flow.grade_essay("same essay").await;
    let second = flow.grade_essay("same essay").await;

    assert_eq!(first, second);
    assert_eq!(grader.calls(), 12);
}

#[tokio::test]
async fn test_records_use_dashboard_field_names() {
    let grader = Arc::new(ScriptedGrader::new(|dimension, _| {
        if dimension.key == "ideas" {
            Ok("not json".to_string())
        } else {
            Ok(graded(2, "ok"))
        }
    }));
    let report = flow_with(&grader).grade_essay("essay").await;
    let records = serde_json::to_value(report.to_records()).unwrap();

    assert_eq!(records[0]["type"], "ideas");
    assert!(records[0]["grade"].is_null());
    assert_eq!(records[1]["type"], "organization");
    assert_eq!(records[1]["grade"], 2);
    assert_eq!(records[1]["comments"], "ok");
}

#[tokio::test]
async fn test_structured_comments_do_not_discard_grades() {
    let grader = Arc::new(ScriptedGrader::new(|_, _| {
        Ok(serde_json::json!({
            "grade": 4,
            "comments": { "reasoning": "Clear idea.", "suggestions": "Add detail." }
        })
        .to_string())
    }));

    let report = flow_with(&grader).grade_essay("essay").await;

    assert_eq!(report.ungraded_count(), 0);
    for result in report.iter() {
        assert_eq!(result.grade.score(), Some(4));
        assert!(result.comments.contains("Clear idea."));
        assert!(result.comments.contains("Add detail."));
    }
}
