use serde_json::{Map, Value, json};

use crate::spec::form::FormDefinition;
use crate::spec::question::{QuestionSpec, QuestionType};
use crate::visibility::VisibleSet;

/// JSON schema of the answers acceptable under the current visibility.
pub fn generate(form: &FormDefinition, visible: &VisibleSet) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in form
        .questions
        .iter()
        .filter(|question| visible.contains(question.id))
    {
        let key = question.id.to_string();
        properties.insert(key.clone(), question_schema(question));
        if question.required {
            required.push(Value::String(key));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": form.title,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn question_schema(question: &QuestionSpec) -> Value {
    let mut schema = match question.kind {
        QuestionType::MultiChoice => json!({
            "type": "array",
            "uniqueItems": true,
            "items": options_schema(question),
        }),
        QuestionType::SingleChoice | QuestionType::SingleSelect => options_schema(question),
        QuestionType::Email => json!({ "type": "string", "format": "email" }),
        QuestionType::Date => json!({ "type": "string", "format": "date" }),
        // Browser time inputs omit seconds and offsets, so no RFC 3339 format.
        QuestionType::FreeText
        | QuestionType::LongText
        | QuestionType::Number
        | QuestionType::Time
        | QuestionType::DateTime => json!({ "type": "string" }),
    };
    if let Value::Object(map) = &mut schema {
        map.insert(
            "title".into(),
            Value::String(question.question_text.clone()),
        );
    }
    schema
}

fn options_schema(question: &QuestionSpec) -> Value {
    let options = question
        .options
        .iter()
        .filter(|option| !option.trim().is_empty())
        .cloned()
        .map(Value::String)
        .collect::<Vec<_>>();
    if options.is_empty() {
        json!({ "type": "string" })
    } else {
        json!({ "type": "string", "enum": options })
    }
}
