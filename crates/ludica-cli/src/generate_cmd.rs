use std::fmt::Write as _;

use anyhow::{Context, Result};

use ludica_core::demo::FailureNotice;
use ludica_core::{AgeGroup, ClientConfig, GenerateError, LessonGenerator, LessonIdea, Theme};

/// Exit code for configuration problems (missing credential).
pub const EXIT_CONFIGURATION: i32 = 2;
/// Exit code for every other generation failure.
pub const EXIT_FAILURE: i32 = 1;

/// Execute `ludica generate`: one request, printed to stdout.
///
/// Returns the process exit code. An empty theme is rejected before the
/// model client is built.
pub async fn run_generate(
    config: &ClientConfig,
    theme: &str,
    age: AgeGroup,
    json: bool,
) -> Result<i32> {
    let theme = Theme::new(theme).context("--theme must not be empty")?;
    let generator = LessonGenerator::from_config(config).context("failed to build model client")?;

    tracing::debug!(?generator, theme = %theme, "generating lesson");

    match generator.generate(&theme, age).await {
        Ok(lesson) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&lesson).context("failed to serialize lesson")?
                );
            } else {
                print!("{}", format_lesson(&lesson));
            }
            Ok(0)
        }
        Err(err) => {
            report_failure(&err);
            Ok(exit_code(&err))
        }
    }
}

/// Exit code for a failed generation.
pub fn exit_code(err: &GenerateError) -> i32 {
    if err.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// Print the user-facing failure text to stderr, see [`failure_lines`].
fn report_failure(err: &GenerateError) {
    for line in failure_lines(err) {
        eprintln!("{line}");
    }
}

/// Lines describing a failed generation.
///
/// A hint already names what to fix, so the underlying error is only added
/// when there is no hint.
pub fn failure_lines(err: &GenerateError) -> Vec<String> {
    match FailureNotice::from_error(err) {
        Some(notice) => match notice.hint {
            Some(hint) => vec![notice.message, hint],
            None => vec![notice.message, format!("(detail: {err})")],
        },
        None => vec![err.to_string()],
    }
}

/// Render a lesson as plain text.
pub fn format_lesson(lesson: &LessonIdea) -> String {
    let mut out = String::new();
    let title = lesson.title();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Objetivo: {}", lesson.objective());
    let _ = writeln!(out);
    let _ = writeln!(out, "Materiais:");
    for item in lesson.materials() {
        let _ = writeln!(out, "  - {item}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Passo a passo:");
    for (i, step) in lesson.steps().iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", i + 1);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Dica: {}", lesson.tips());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludica_core::lesson::parse_lesson;
    use ludica_core::model::ModelError;

    fn lesson() -> LessonIdea {
        parse_lesson(ludica_test_utils::SAMPLE_LESSON_JSON).unwrap()
    }

    #[test]
    fn format_lists_materials_and_numbers_steps() {
        let text = format_lesson(&lesson());
        assert!(text.starts_with("Jardim das Cores\n================\n"), "{text}");
        assert!(text.contains("  - Flores variadas\n"));
        assert!(text.contains("  1. Leve as crianças"));
        assert!(text.contains("  3. Colem juntos"));
        assert!(text.contains("Dica: Verifique"));
    }

    #[test]
    fn exit_codes_separate_configuration() {
        let missing = GenerateError::MissingCredential {
            expected: "x".into(),
        };
        assert_eq!(exit_code(&missing), EXIT_CONFIGURATION);

        let service: GenerateError = ModelError::Other("down".into()).into();
        assert_eq!(exit_code(&service), EXIT_FAILURE);
    }

    #[test]
    fn configuration_failure_is_reported_once_in_portuguese() {
        let err = GenerateError::MissingCredential {
            expected: "LUDICA_API_KEY, API_KEY".into(),
        };
        let lines = failure_lines(&err);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Erro de configuração"));
        assert!(lines[1].contains("defina a chave em LUDICA_API_KEY, API_KEY"));
        assert!(lines.iter().all(|l| !l.contains("not configured")), "{lines:?}");
    }

    #[test]
    fn transient_failure_keeps_detail() {
        let err: GenerateError = ModelError::Status {
            status: 503,
            body: "overloaded".into(),
        }
        .into();
        let lines = failure_lines(&err);
        assert!(lines[0].starts_with("Ops!"));
        assert!(lines[1].contains("503"), "{lines:?}");
    }

    #[tokio::test]
    async fn empty_theme_is_rejected_before_any_request() {
        let _lock = crate::test_util::lock_env();
        let server =
            ludica_test_utils::FakeGemini::start(ludica_test_utils::FakeReply::Text(String::new()))
                .await;
        let config = ClientConfig::with_endpoint(server.endpoint());

        let err = run_generate(&config, "  ", AgeGroup::Toddler, false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("--theme"), "unexpected: {err:#}");
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn missing_credential_exits_with_configuration_code() {
        let _lock = crate::test_util::lock_env();
        let server = ludica_test_utils::FakeGemini::start(ludica_test_utils::FakeReply::Text(
            ludica_test_utils::SAMPLE_LESSON_JSON.into(),
        ))
        .await;
        let mut config = ClientConfig::with_endpoint(server.endpoint());
        config.credential_vars = vec!["LUDICA_TEST_UNSET_KEY_91c2".to_string()];

        let code = run_generate(&config, "Primavera", AgeGroup::Toddler, false)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIGURATION);
        assert_eq!(server.hits(), 0);
    }
}
