mod wizard;

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use component_form::{
    get_answer_schema, get_definition_schema, lint_form, render_json_ui, render_text,
    submit_all, submit_patch, visible,
};
use form_spec::{AnswerMap, JsonLinesSink, Submission, SubmissionSink};
use serde_json::{Value, json};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wizard::{
    AnswerParseError, PromptContext, Verbosity, WizardPayload, WizardPresenter, WizardQuestion,
    parse_answer,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fill and submit skip-logic forms",
    long_about = "Walks a form definition with skip logic, keeps hidden answers out of the response and gates required questions"
)]
struct Cli {
    /// Log engine decisions to stderr (same as RUST_LOG=debug).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a form interactively, then submit it.
    Fill {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM", env = "FORM_WIZARD_FORM")]
        form: PathBuf,
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Respondent name; prompted for when absent.
        #[arg(long, env = "FORM_WIZARD_RESPONDENT")]
        respondent: Option<String>,
        /// Append the submission as a JSON line to this file.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// How the form state is shown after the last answer.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the visible questions for a set of answers.
    Visible {
        #[arg(long, value_name = "FORM", env = "FORM_WIZARD_FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Validate and submit a set of answers non-interactively.
    Submit {
        #[arg(long, value_name = "FORM", env = "FORM_WIZARD_FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, env = "FORM_WIZARD_RESPONDENT")]
        respondent: String,
        /// Append the submission as a JSON line to this file.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Report authoring problems in a form definition.
    Lint {
        #[arg(long, value_name = "FORM", env = "FORM_WIZARD_FORM")]
        form: PathBuf,
    },
    /// Print the form definition schema, or the answer schema of a form.
    Schema {
        #[arg(long, value_name = "FORM")]
        form: Option<PathBuf>,
        #[arg(long, value_name = "ANSWERS", requires = "form")]
        answers: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fill {
            form,
            answers,
            respondent,
            out,
            format,
        } => run_fill(
            &form,
            answers.as_deref(),
            respondent,
            out.as_deref(),
            format,
            cli.verbose,
        ),
        Command::Visible { form, answers } => run_visible(&form, answers.as_deref()),
        Command::Submit {
            form,
            answers,
            respondent,
            out,
        } => run_submit(&form, &answers, &respondent, out.as_deref()),
        Command::Lint { form } => run_lint(&form),
        Command::Schema { form, answers } => run_schema(form.as_deref(), answers.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Form id plus the component config embedding the definition.
struct LoadedForm {
    id: String,
    config_json: String,
}

fn load_form(path: &Path) -> CliResult<LoadedForm> {
    let spec_str = fs::read_to_string(path)?;
    let spec_value: Value = serde_json::from_str(&spec_str)?;
    let id = spec_value
        .get("id")
        .and_then(Value::as_str)
        .ok_or("form definition is missing an id")?
        .to_string();
    debug!(form = %id, path = %path.display(), "loaded form definition");
    Ok(LoadedForm {
        id,
        config_json: json!({ "form_spec_json": spec_str }).to_string(),
    })
}

fn load_answers(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let answers: AnswerMap = serde_json::from_str(&contents)?;
            Ok(serde_json::to_string(&answers)?)
        }
        None => Ok("{}".to_string()),
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn run_visible(form_path: &Path, answers_path: Option<&Path>) -> CliResult<()> {
    let form = load_form(form_path)?;
    let answers = load_answers(answers_path)?;
    let result = parse_component_result(&visible(&form.id, &form.config_json, &answers))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_lint(form_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let result = parse_component_result(&lint_form(&form.id, &form.config_json))?;
    let issues = result["issues"].as_array().cloned().unwrap_or_default();
    if issues.is_empty() {
        println!("No issues found in {}", form.id);
        return Ok(());
    }
    for issue in &issues {
        let location = issue["question_id"]
            .as_u64()
            .map(|id| format!("question {}", id))
            .unwrap_or_else(|| "form".to_string());
        println!(
            "{} [{}]: {}",
            location,
            issue["code"].as_str().unwrap_or("unknown"),
            issue["message"].as_str().unwrap_or_default()
        );
    }
    Err(format!("{} issue(s) found", issues.len()).into())
}

fn run_schema(form_path: Option<&Path>, answers_path: Option<&Path>) -> CliResult<()> {
    let schema = match form_path {
        Some(path) => {
            let form = load_form(path)?;
            let answers = load_answers(answers_path)?;
            parse_component_result(&get_answer_schema(&form.id, &form.config_json, &answers))?
        }
        None => parse_component_result(&get_definition_schema())?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_submit(
    form_path: &Path,
    answers_path: &Path,
    respondent: &str,
    out: Option<&Path>,
) -> CliResult<()> {
    let form = load_form(form_path)?;
    let answers = load_answers(Some(answers_path))?;
    let submission = submit(&form, &answers, respondent)?;
    println!("{}", submission.to_json_pretty()?);
    deliver(&form.id, &submission, out)
}

/// Runs the submission gate; a gate rejection becomes the command error.
fn submit(form: &LoadedForm, answers: &str, respondent: &str) -> CliResult<Submission> {
    let response = parse_component_result(&submit_all(
        &form.id,
        &form.config_json,
        answers,
        respondent,
    ))?;
    if response["status"] != "submitted" {
        let message = response["error"]["message"]
            .as_str()
            .unwrap_or("submission rejected")
            .to_string();
        if let Some(missing) = response["missing_required"].as_array()
            && !missing.is_empty()
        {
            let ids = missing
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            eprintln!("Missing required answers: {}", ids);
        }
        return Err(message.into());
    }
    Ok(serde_json::from_value(response["submission"].clone())?)
}

fn deliver(form_id: &str, submission: &Submission, out: Option<&Path>) -> CliResult<()> {
    let Some(path) = out else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut sink = JsonLinesSink::new(file);
    sink.deliver(form_id, submission)?;
    info!(path = %path.display(), "submission written");
    Ok(())
}

fn run_fill(
    form_path: &Path,
    answers_path: Option<&Path>,
    respondent: Option<String>,
    out: Option<&Path>,
    format: RenderMode,
    verbose: bool,
) -> CliResult<()> {
    let form = load_form(form_path)?;
    let mut answers: Value = serde_json::from_str(&load_answers(answers_path)?)?;
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));

    // Questions already answered or deliberately left blank in this run.
    let mut visited: BTreeSet<u64> = answers
        .as_object()
        .map(|map| map.keys().filter_map(|key| key.parse().ok()).collect())
        .unwrap_or_default();

    loop {
        let answers_str = answers.to_string();
        let ui =
            parse_component_result(&render_json_ui(&form.id, &form.config_json, &answers_str))?;
        let payload =
            WizardPayload::from_json(&ui).map_err(|err| format!("wizard UI error: {}", err))?;
        presenter.show_header(&payload);
        presenter.show_status(&payload);

        let Some(question) = payload
            .questions
            .iter()
            .find(|question| question.visible && !visited.contains(&question.id))
        else {
            break;
        };

        let prompt = PromptContext::new(question, payload.total);
        let Some(value) = prompt_question(&prompt, question, &presenter)? else {
            visited.insert(question.id);
            continue;
        };

        let response = parse_component_result(&submit_patch(
            &form.id,
            &form.config_json,
            &answers_str,
            question.id,
            &serde_json::to_string(&value)?,
        ))?;
        if response["status"] == "error" {
            presenter.show_rejected(
                response["error"]["message"]
                    .as_str()
                    .unwrap_or("answer rejected"),
            );
            visited.insert(question.id);
            continue;
        }
        answers = response["answers"].clone();
        visited.insert(question.id);
    }

    let answers_str = answers.to_string();
    match format {
        RenderMode::Text => println!(
            "{}",
            render_text(&form.id, &form.config_json, &answers_str)
        ),
        RenderMode::Json => {
            let ui =
                parse_component_result(&render_json_ui(&form.id, &form.config_json, &answers_str))?;
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }

    let respondent = match respondent {
        Some(name) => name,
        None => prompt_line("Your name")?,
    };
    let submission = submit(&form, &answers_str, &respondent)?;
    presenter.show_submission(&submission)?;
    deliver(&form.id, &submission, out)
}

fn prompt_line(label: &str) -> CliResult<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err("input closed".into());
    }
    Ok(input.trim().to_string())
}

/// Reads until the input parses. `None` means an optional question was left
/// blank.
fn prompt_question(
    prompt: &PromptContext,
    question: &WizardQuestion,
    presenter: &WizardPresenter,
) -> CliResult<Option<Value>> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input closed before the form was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("wizard aborted by user".into());
        }
        if trimmed.is_empty() {
            if question.required {
                presenter.show_parse_error(&AnswerParseError::new("this question is required"));
                continue;
            }
            return Ok(None);
        }

        match parse_answer(question, trimmed) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}
