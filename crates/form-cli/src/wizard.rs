use serde_json::Value;

use form_spec::{QuestionType, Submission};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: status, visible questions, hidden counts.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and state as the wizard walks the visible questions.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, payload: &WizardPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        if let Some(help) = &payload.help {
            println!("{}", help);
        }
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &WizardPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!(
            "Status: {} ({}/{}, {} hidden)",
            payload.status, payload.answered, payload.total, payload.hidden
        );
        println!("Visible questions:");
        for question in payload.questions.iter().filter(|question| question.visible) {
            let mut entry = format!(
                " {}. {}",
                question.number.unwrap_or_default(),
                question.text
            );
            if question.required {
                entry.push_str(" [required]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.number, prompt.total, prompt.text);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        for (index, option) in prompt.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
    }

    pub fn show_rejected(&self, message: &str) {
        eprintln!("Answer rejected: {}", message);
    }

    pub fn show_submission(&self, submission: &Submission) -> Result<(), serde_json::Error> {
        println!("Done ✅");
        if self.verbosity.is_verbose() {
            println!("{}", submission.to_json_pretty()?);
        } else {
            println!(
                "Submitted {} answers for {}",
                submission.answers.len(),
                submission.respondent_name
            );
        }
        Ok(())
    }
}

/// Render payload extracted from the component output.
pub struct WizardPayload {
    pub form_title: String,
    pub help: Option<String>,
    pub status: String,
    pub answered: u64,
    pub total: u64,
    pub hidden: u64,
    pub questions: Vec<WizardQuestion>,
}

impl WizardPayload {
    pub fn from_json(json: &Value) -> Result<Self, String> {
        let form_title = json
            .get("form_title")
            .and_then(Value::as_str)
            .ok_or_else(|| "wizard payload missing form_title".to_string())?
            .to_string();
        let help = json
            .get("help")
            .and_then(Value::as_str)
            .map(|value| value.to_string());
        let status = json
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("need_input")
            .to_string();
        let progress = json
            .get("progress")
            .and_then(Value::as_object)
            .ok_or_else(|| "wizard payload missing progress".to_string())?;
        let counter = |key: &str| progress.get(key).and_then(Value::as_u64).unwrap_or(0);
        let questions = json
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| "wizard payload missing questions".to_string())?
            .iter()
            .map(WizardQuestion::from_json)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            form_title,
            help,
            status,
            answered: counter("answered"),
            total: counter("total"),
            hidden: counter("hidden"),
            questions,
        })
    }
}

/// Minimal view of a question used for rendering prompts.
pub struct WizardQuestion {
    pub id: u64,
    pub number: Option<u64>,
    pub text: String,
    pub kind: QuestionType,
    pub required: bool,
    pub options: Vec<String>,
    pub visible: bool,
}

impl WizardQuestion {
    fn from_json(value: &Value) -> Result<Self, String> {
        let id = value
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| "question missing id".to_string())?;
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("question {} missing text", id))?
            .to_string();
        let kind = value
            .get("type")
            .cloned()
            .and_then(|label| serde_json::from_value(label).ok())
            .unwrap_or_default();
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(Self {
            id,
            number: value.get("number").and_then(Value::as_u64),
            text,
            kind,
            required: value
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            options,
            visible: value
                .get("visible")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        })
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub number: u64,
    pub total: u64,
    pub text: String,
    pub required: bool,
    pub hint: Option<String>,
    pub options: Vec<String>,
}

impl PromptContext {
    pub fn new(question: &WizardQuestion, total: u64) -> Self {
        Self {
            number: question.number.unwrap_or(1),
            total,
            text: question.text.clone(),
            required: question.required,
            hint: hint(question.kind),
            options: question.options.clone(),
        }
    }
}

fn hint(kind: QuestionType) -> Option<String> {
    let hint = match kind {
        QuestionType::MultiChoice => "(comma-separated numbers or options)",
        QuestionType::SingleChoice | QuestionType::SingleSelect => "(number or option)",
        QuestionType::Number => "(number)",
        QuestionType::Date => "(YYYY-MM-DD)",
        QuestionType::Time => "(HH:MM)",
        QuestionType::DateTime => "(YYYY-MM-DDTHH:MM)",
        QuestionType::Email => "(email)",
        QuestionType::FreeText | QuestionType::LongText => return None,
    };
    Some(hint.to_string())
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
        }
    }
}

/// Turns raw input into the JSON answer value sent to the component.
pub fn parse_answer(question: &WizardQuestion, raw: &str) -> Result<Value, AnswerParseError> {
    match question.kind {
        QuestionType::SingleChoice | QuestionType::SingleSelect => {
            resolve_option(&question.options, raw).map(Value::String)
        }
        QuestionType::MultiChoice => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| resolve_option(&question.options, part).map(Value::String))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        QuestionType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|_| Value::String(raw.to_string()))
            .ok_or_else(|| AnswerParseError::new("expected a number")),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn resolve_option(options: &[String], raw: &str) -> Result<String, AnswerParseError> {
    if let Ok(index) = raw.parse::<usize>()
        && let Some(option) = index.checked_sub(1).and_then(|index| options.get(index))
    {
        return Ok(option.clone());
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw))
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(format!("choose one of: {}", options.join(", ")))
        })
}
