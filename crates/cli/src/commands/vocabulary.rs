use maxim_core::{list_fields, list_types};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct Vocabulary {
    fields: Vec<&'static str>,
    types: Vec<&'static str>,
}

pub fn run() -> CommandResult {
    let vocabulary = Vocabulary { fields: list_fields(), types: list_types() };
    CommandResult::document("vocabulary", &vocabulary)
}
