//! Prompt and structured-output schema construction.
//!
//! Pure logic: nothing here performs I/O.

use serde_json::{Value, json};

use crate::lesson::{AgeGroup, Theme};

/// Fixed system instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "Você é um especialista em educação infantil lúdica e \
neuroeducação. Crie atividades práticas, simples e altamente envolventes, baseadas no brincar \
e na exploração sensorial, adequadas à faixa etária indicada e que não exijam materiais caros. \
Responda somente com o objeto JSON solicitado, sem blocos de código markdown.";

/// Field names of the lesson object, in the order the model should emit them.
pub const LESSON_FIELDS: [&str; 5] = ["title", "objective", "materials", "steps", "tips"];

/// Build the user prompt embedding the theme and age group.
pub fn build_user_prompt(theme: &Theme, age: AgeGroup) -> String {
    format!(
        "Crie uma atividade lúdica para Educação Infantil com o tema \"{theme}\" para a faixa \
         etária \"{age}\". Inclua um título curto, o objetivo pedagógico, a lista de materiais, \
         o passo a passo e uma dica para a educadora.",
        theme = theme.as_str(),
        age = age.label(),
    )
}

/// Response schema describing a [`crate::LessonIdea`], in the model API's
/// OpenAPI-subset notation.
pub fn lesson_response_schema() -> Value {
    let string = || json!({ "type": "STRING" });
    let string_list = || json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": string(),
            "objective": string(),
            "materials": string_list(),
            "steps": string_list(),
            "tips": string(),
        },
        "required": LESSON_FIELDS,
        "propertyOrdering": LESSON_FIELDS,
    })
}
