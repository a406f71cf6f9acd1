use maxim_core::vocabulary::{list_fields, list_types};
use maxim_core::{GenerationRequest, Subject};

/// Stable curator instruction. Only the vocabulary tables are substituted in, never
/// request content.
pub fn system_instruction() -> String {
    let fields = list_fields().join(" | ");
    let types = list_types().join(" | ");
    format!(
        r#"You are an intelligent academic curator who collects short, fascinating, and thought-provoking concepts from diverse fields of study.

Your task is to produce one profound, precise, real, or academically recognized entry: a law, effect, phenomenon, principle, theory, syndrome, or memorable quote that sounds insightful, profound, or surprisingly true.

Each entry must include the actual name and the quote or statement itself, followed by a clear, intellectual summary explaining its meaning or application. If you receive a keyword instead of a field, return an entry related to that keyword.

Return your response strictly as a single JSON object with these keys:
- "name": the name of the concept, law, theory, or effect
- "field": exactly one of {fields}
- "type": exactly one of {types}
- "quote": the actual phrase, law, or saying itself
- "summary": 1-3 sentences explaining what the statement means, why it is interesting, or how it applies to human behavior or real life
- "author": the original author or source if known, otherwise null
- "time": the year or period when the concept was introduced or the quote was made, otherwise null

Guidelines:
1) The quote must be authentic or a commonly accepted phrasing of the concept (e.g. "The Butterfly Effect", "Occam's Razor", "The Dunning-Kruger Effect").
2) The summary should read like a well-crafted encyclopedia note: concise but insightful.
3) Use the requested field and type verbatim in the "field" and "type" keys.
4) No reasoning steps or commentary outside the JSON. The output must be valid JSON only.
"#
    )
}

/// Per-call instruction. A length hint of zero or below never reaches this point as a
/// number (see `LengthHint::from_raw`), so it renders exactly like an absent hint.
pub fn user_instruction(request: &GenerationRequest) -> String {
    let concept_type = request.concept_type.as_str();
    let subject = match &request.subject {
        Subject::Field(field) => {
            format!("Provide one entry of type \"{concept_type}\" from the \"{field}\" field.")
        }
        Subject::Keyword(keyword) => format!(
            "Provide one entry of type \"{concept_type}\" related to the keyword \"{}\". \
             Set \"field\" to whichever of {} fits it best.",
            keyword.trim(),
            list_fields().join(", ")
        ),
    };

    let length = match request.length_hint.chars() {
        Some(chars) => {
            format!("The \"quote\" text should be approximately {chars} characters long.")
        }
        None => "The length of the \"quote\" text is unconstrained.".to_string(),
    };

    format!("{subject} {length}")
}
