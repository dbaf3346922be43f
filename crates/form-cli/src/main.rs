mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use component_form::{
    get_spec_schema, pdf_plan, render_json_ui, render_text, submit, validate_values,
};
use form_spec::{
    ArtifactEncoder, FieldDefinition, FieldType, FieldValue, FormSession, FormSpec,
    JsonArtifactEncoder, ValueBag, is_visible,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wizard::{PromptContext, Verbosity, WizardPresenter, parse_answer};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Dynamic form CLI",
    long_about = "Evaluates form specs: visibility, validation, canonical export and PDF layout"
)]
struct Cli {
    /// Log evaluation details to stderr (overridden by RUST_LOG).
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
    /// Fill a form interactively, one visible field at a time.
    Fill {
        /// Path to the form spec JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Optional JSON file with initial values.
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        /// Write the export payload to this file.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
    },
    /// Validate a values file against a form spec.
    Validate {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Validate and print the canonical export payload.
    Submit {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
        /// Write the export payload to this file.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
        /// Reject payloads that do not fit in a single QR symbol.
        #[arg(long)]
        qr: bool,
    },
    /// Render the current form state.
    Render {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the PDF page layout for the form.
    PdfPlan {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
    },
    /// Print the JSON Schema of form spec documents.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Fill { spec, values, out } => run_fill(spec, values, out, cli.verbose),
        Command::Validate { spec, values } => run_validate(&spec, &values),
        Command::Submit {
            spec,
            values,
            out,
            qr,
        } => run_submit(&spec, &values, out.as_deref(), qr),
        Command::Render {
            spec,
            values,
            format,
        } => run_render(&spec, values.as_deref(), format),
        Command::PdfPlan { spec, values } => {
            let response = pdf_plan(&config_for(&spec)?, &read_values(values.as_deref())?);
            println!("{}", pretty(&parse_component_result(&response)?)?);
            Ok(())
        }
        Command::Schema => {
            println!("{}", pretty(&parse_component_result(&get_spec_schema())?)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn config_for(spec_path: &Path) -> CliResult<String> {
    let spec_str = fs::read_to_string(spec_path)?;
    Ok(json!({ "form_spec_json": spec_str }).to_string())
}

fn read_values(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
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

fn pretty(value: &Value) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn run_validate(spec_path: &Path, values_path: &Path) -> CliResult<()> {
    let response = validate_values(&config_for(spec_path)?, &read_values(Some(values_path))?);
    let result = parse_component_result(&response)?;
    let valid = result["valid"].as_bool().unwrap_or(false);
    println!(
        "Validation result: {}",
        if valid { "valid" } else { "invalid" }
    );
    describe_errors(&result["errors"]);

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_errors(errors: &Value) {
    if let Some(errors) = errors.as_object()
        && !errors.is_empty()
    {
        println!("Errors:");
        for (field, reason) in errors {
            println!("  {} - {}", field, reason.as_str().unwrap_or("invalid"));
        }
    }
}

fn run_submit(
    spec_path: &Path,
    values_path: &Path,
    out: Option<&Path>,
    qr: bool,
) -> CliResult<()> {
    let spec_str = fs::read_to_string(spec_path)?;
    let config = json!({ "form_spec_json": spec_str, "qr_limit": qr }).to_string();
    let response = submit(&config, &read_values(Some(values_path))?);
    let result = parse_component_result(&response)?;

    match result["status"].as_str() {
        Some("complete") => {
            let payload = result["canonical"]
                .as_str()
                .ok_or("submit response is missing the canonical payload")?;
            println!("{}", payload);
            if let Some(out) = out {
                fs::write(out, payload)?;
            }
            Ok(())
        }
        Some("error") => {
            println!("Validation result: invalid");
            describe_errors(&result["errors"]);
            Err("validation failed".into())
        }
        _ => Err(result["message"]
            .as_str()
            .unwrap_or("artifact generation failed")
            .into()),
    }
}

fn run_render(spec_path: &Path, values_path: Option<&Path>, format: RenderMode) -> CliResult<()> {
    let config = config_for(spec_path)?;
    let values = read_values(values_path)?;
    match format {
        RenderMode::Text => {
            let output = render_text(&config, &values);
            if output.starts_with('{') {
                parse_component_result(&output)?;
            }
            println!("{}", output);
        }
        RenderMode::Json => {
            let ui = parse_component_result(&render_json_ui(&config, &values))?;
            println!("{}", pretty(&ui)?);
        }
    }
    Ok(())
}

fn run_fill(
    spec_path: PathBuf,
    values_path: Option<PathBuf>,
    out: Option<PathBuf>,
    verbose: bool,
) -> CliResult<()> {
    let spec = FormSpec::from_json(&fs::read_to_string(&spec_path)?)?;
    let initial = match values_path {
        Some(path) => {
            let raw: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            ValueBag::from_json_lossy(&raw)
        }
        None => ValueBag::new(),
    };
    let mut session = FormSession::with_values(spec, initial)?;
    let presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));
    presenter.show_header(session.spec());

    // A field is prompted once, then again only while it fails validation.
    let mut asked: BTreeSet<String> = BTreeSet::new();
    let mut pending: BTreeSet<String> = BTreeSet::new();
    loop {
        presenter.show_visible(&session.visible_fields());
        let fields = session.spec().fields.clone();
        for field in &fields {
            if !is_visible(field, session.values()) {
                continue;
            }
            if asked.contains(&field.field_key) && !pending.contains(&field.field_key) {
                continue;
            }
            let visible = session.visible_fields();
            let index = visible
                .iter()
                .position(|candidate| candidate.field_key == field.field_key)
                .map_or(1, |position| position + 1);
            let prompt = PromptContext::new(field, index, visible.len());
            prompt_field(&mut session, field, &prompt, &presenter)?;
            asked.insert(field.field_key.clone());
            pending.remove(&field.field_key);
        }

        // Answers may reveal fields earlier in the schema or during corrections.
        if session
            .visible_fields()
            .iter()
            .any(|field| !asked.contains(&field.field_key))
        {
            continue;
        }

        let result = session.validate();
        if result.is_valid() {
            break;
        }
        presenter.show_errors(session.spec(), &result);
        pending = result.iter().map(|(key, _)| key.clone()).collect();
    }

    let payload = session
        .try_submit()
        .map_err(|result| format!("{} field(s) failed validation", result.len()))?;
    let artifact = JsonArtifactEncoder::default().encode(&payload)?;
    let json = payload.to_canonical_json()?;
    presenter.show_completion(&payload, &json, &artifact.data_url());
    if let Some(out) = out {
        fs::write(out, &json)?;
    }
    Ok(())
}

fn prompt_field(
    session: &mut FormSession,
    field: &FieldDefinition,
    prompt: &PromptContext,
    presenter: &WizardPresenter,
) -> CliResult<()> {
    loop {
        presenter.show_prompt(prompt);
        let current = session
            .values()
            .get(&field.field_key)
            .map(FieldValue::display)
            .filter(|value| !value.is_empty());
        let raw = prompt_line("> ", current.as_deref())?;
        if raw.trim() == "-" {
            session.clear_value(&field.field_key)?;
            return Ok(());
        }
        if current.as_deref() == Some(raw.as_str()) {
            return Ok(());
        }
        match parse_answer(field, &raw) {
            Ok(FieldValue::List(entries)) if field.kind == FieldType::DynamicList => {
                session.clear_value(&field.field_key)?;
                for (index, entry) in entries.into_iter().enumerate() {
                    session.append(&field.field_key)?;
                    session.update(&field.field_key, index, entry)?;
                }
                return Ok(());
            }
            Ok(value)
                if !value.is_present() && !session.values().contains_key(&field.field_key) =>
            {
                return Ok(());
            }
            Ok(value) => {
                session.set_value(&field.field_key, value)?;
                return Ok(());
            }
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn prompt_line(prompt: &str, default: Option<&str>) -> CliResult<String> {
    if let Some(default_value) = default {
        print!("{}[{}] ", prompt, default_value);
    } else {
        print!("{}", prompt);
    }
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err("unexpected end of input".into());
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
