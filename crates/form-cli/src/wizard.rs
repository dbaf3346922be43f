use form_spec::{
    Address, ExportPayload, FieldDefinition, FieldType, FieldValue, FormSpec, ValidationResult,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: field prompts only.
    Clean,
    /// Verbose output: visible fields, validation details, encoded artifact.
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

/// Prints prompts and outcomes for the interactive fill session.
pub struct WizardPresenter {
    verbosity: Verbosity,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn show_header(&self, spec: &FormSpec) {
        println!("Form: {}", spec.title);
        if self.verbosity.is_verbose()
            && let Some(help) = &spec.description
        {
            println!("Help: {}", help);
        }
    }

    pub fn show_visible(&self, fields: &[&FieldDefinition]) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!("Visible fields:");
        for field in fields {
            let mut entry = format!(" - {} ({})", field.field_key, field.display_label());
            if field.is_required() {
                entry.push_str(" [required]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.label);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_errors(&self, spec: &FormSpec, result: &ValidationResult) {
        eprintln!("Please correct the following fields:");
        for field in &spec.fields {
            if let Some(message) = result.message_for(field) {
                eprintln!("  {}: {}", field.display_label(), message);
            }
        }
    }

    pub fn show_completion(&self, payload: &ExportPayload, json: &str, data_url: &str) {
        println!("Done ✅ ({} fields)", payload.len());
        println!("{}", json);
        if self.verbosity.is_verbose() {
            println!("Data URL: {}", data_url);
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
}

impl PromptContext {
    pub fn new(field: &FieldDefinition, index: usize, total: usize) -> Self {
        Self {
            index,
            total,
            label: field.display_label().to_string(),
            required: field.is_required(),
            hint: hint(field),
        }
    }
}

fn hint(field: &FieldDefinition) -> Option<String> {
    match field.kind {
        FieldType::Text | FieldType::MultilineText => None,
        FieldType::Currency => Some("(amount, e.g. 12.50)".to_string()),
        FieldType::Select | FieldType::Radio | FieldType::RegionCode => {
            Some(format!("({})", field.effective_options().join("/")))
        }
        FieldType::MultiSelect => Some(format!(
            "(comma-separated: {})",
            field.effective_options().join("/")
        )),
        FieldType::DynamicList => Some("(entries separated by ';')".to_string()),
        FieldType::Address => Some("(street; city; zip)".to_string()),
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Parses one line of user input into a value of the field's kind.
pub fn parse_answer(field: &FieldDefinition, raw: &str) -> Result<FieldValue, AnswerParseError> {
    let raw = raw.trim();
    match field.kind {
        FieldType::Text | FieldType::MultilineText => Ok(FieldValue::Text(raw.to_string())),
        FieldType::Currency => parse_currency(raw),
        FieldType::Select | FieldType::Radio | FieldType::RegionCode => {
            parse_choice(&field.effective_options(), raw).map(FieldValue::Text)
        }
        FieldType::MultiSelect => {
            let options = field.effective_options();
            split(raw, ',')
                .map(|item| parse_choice(&options, item))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List)
        }
        FieldType::DynamicList => Ok(FieldValue::List(
            split(raw, ';').map(str::to_string).collect(),
        )),
        FieldType::Address => parse_address(raw),
    }
}

fn split(raw: &str, separator: char) -> impl Iterator<Item = &str> {
    raw.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_currency(raw: &str) -> Result<FieldValue, AnswerParseError> {
    if raw.is_empty() {
        return Ok(FieldValue::Text(String::new()));
    }
    let amount: f64 = raw.parse().map_err(|_| {
        AnswerParseError::new(
            "Please enter an amount.",
            Some("a decimal number such as 12.50".into()),
        )
    })?;
    let decimals = raw.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    if !amount.is_finite() || decimals > 2 {
        return Err(AnswerParseError::new(
            "Amounts use at most two decimal places.",
            Some(format!("got {}", raw)),
        ));
    }
    Ok(FieldValue::Text(raw.to_string()))
}

fn parse_choice(options: &[String], raw: &str) -> Result<String, AnswerParseError> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw))
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("'{}' is not one of the options.", raw),
                Some(options.join(", ")),
            )
        })
}

fn parse_address(raw: &str) -> Result<FieldValue, AnswerParseError> {
    let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(AnswerParseError::new(
            "Addresses have at most three parts.",
            Some("street; city; zip".into()),
        ));
    }
    let part = |index: usize| {
        parts
            .get(index)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    };
    Ok(FieldValue::Address(Address {
        street: part(0),
        city: part(1),
        zip: part(2),
    }))
}
