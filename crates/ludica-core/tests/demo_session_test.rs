//! Integration tests for the demo interaction flow: gating, cancellation,
//! and error presentation, driven through a real [`LessonGenerator`].

use std::time::Duration;

use ludica_core::LessonGenerator;
use ludica_core::demo::{
    CONFIGURATION_MESSAGE, DemoSession, FailureKind, RequestState, SubmitRejected,
    TRANSIENT_MESSAGE,
};
use ludica_core::lesson::AgeGroup;
use ludica_test_utils::{Reply, SAMPLE_LESSON_JSON, ScriptedModel, StaticCredentials};

fn session(theme: &str) -> DemoSession {
    let mut s = DemoSession::new();
    s.theme_input = theme.to_string();
    s
}

#[tokio::test]
async fn run_reaches_success() {
    let model = ScriptedModel::text(SAMPLE_LESSON_JSON);
    let generator = LessonGenerator::new(model.clone(), StaticCredentials::present("k"));

    let mut s = session("Primavera");
    s.age = AgeGroup::Toddler;
    let state = s.run(&generator).await.unwrap();
    assert!(matches!(state, RequestState::Success(_)));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn empty_theme_never_invokes_generation() {
    let model = ScriptedModel::text(SAMPLE_LESSON_JSON);
    let generator = LessonGenerator::new(model.clone(), StaticCredentials::present("k"));

    for age in AgeGroup::ALL {
        let mut s = session("");
        s.age = age;
        assert_eq!(s.run(&generator).await.unwrap_err(), SubmitRejected::EmptyTheme);
    }
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn submit_while_in_flight_does_not_call_twice() {
    let model = ScriptedModel::text(SAMPLE_LESSON_JSON).gated();
    let generator = LessonGenerator::new(model.clone(), StaticCredentials::present("k"));

    let mut s = session("Primavera");
    let pending = s.begin().unwrap();

    let task = {
        let generator = generator.clone();
        let pending = pending.clone();
        tokio::spawn(async move {
            generator
                .generate_with_cancel(&pending.theme, pending.age, &pending.cancel)
                .await
        })
    };

    // Wait until the model has actually been called.
    while model.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(s.begin().unwrap_err(), SubmitRejected::Busy);
    assert_eq!(s.begin().unwrap_err(), SubmitRejected::Busy);

    model.release();
    let result = task.await.unwrap();
    assert!(s.complete(pending.ticket, result));
    assert!(s.state().lesson().is_some());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn cancel_aborts_in_flight_call() {
    let model = ScriptedModel::text(SAMPLE_LESSON_JSON).gated();
    let generator = LessonGenerator::new(model.clone(), StaticCredentials::present("k"));

    let mut s = session("Primavera");
    let pending = s.begin().unwrap();

    let task = {
        let generator = generator.clone();
        let pending = pending.clone();
        tokio::spawn(async move {
            generator
                .generate_with_cancel(&pending.theme, pending.age, &pending.cancel)
                .await
        })
    };

    while model.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(s.cancel());
    let result = task.await.unwrap();
    assert!(matches!(result, Err(ludica_core::GenerateError::Cancelled)));
    assert!(!s.complete(pending.ticket, result));
    assert_eq!(s.state(), &RequestState::Idle);
    assert!(s.can_submit());
}

#[tokio::test]
async fn configuration_and_transient_failures_are_distinguished() {
    let model = ScriptedModel::new([Reply::Status(500, "boom".into())]);

    let mut s = session("Primavera");
    let no_key = LessonGenerator::new(model.clone(), StaticCredentials::absent());
    let notice = s.run(&no_key).await.unwrap().failure().cloned().unwrap();
    assert_eq!(notice.kind, FailureKind::Configuration);
    assert_eq!(notice.message, CONFIGURATION_MESSAGE);
    assert!(notice.hint.is_some());

    let with_key = LessonGenerator::new(model.clone(), StaticCredentials::present("k"));
    let notice = s.run(&with_key).await.unwrap().failure().cloned().unwrap();
    assert_eq!(notice.kind, FailureKind::Transient);
    assert_eq!(notice.message, TRANSIENT_MESSAGE);
    assert_ne!(CONFIGURATION_MESSAGE, TRANSIENT_MESSAGE);

    // Failed state is stable and a retry is allowed.
    assert!(s.can_submit());
}
