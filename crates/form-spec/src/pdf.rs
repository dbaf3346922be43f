//! Page layout for fillable PDF documents.
//!
//! The layout is computed up front as a [`PdfPlan`]; a [`PdfFormBackend`]
//! supplied by the host turns it into bytes. Only visible fields are placed,
//! and widgets are prefilled from the current values.

use thiserror::Error;

use crate::spec::{FieldDefinition, FieldType, FormSpec};
use crate::value::{FieldValue, ValueBag};
use crate::visibility::visible_fields;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;
/// Cursor height below which the next field starts a new page.
pub const PAGE_BREAK_AT: f32 = 150.0;

const TITLE_SIZE: f32 = 20.0;
const LABEL_SIZE: f32 = 12.0;
const CAPTION_SIZE: f32 = 11.0;
const BOX_WIDTH: f32 = 300.0;
const DROPDOWN_WIDTH: f32 = 200.0;
const ROW_HEIGHT: f32 = 25.0;
const TOGGLE_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    TextBox {
        value: Option<String>,
        multiline: bool,
    },
    Dropdown {
        options: Vec<String>,
        selected: Option<String>,
    },
    RadioGroup {
        buttons: Vec<(String, Rect)>,
        selected: Option<String>,
    },
    CheckBox {
        checked: bool,
    },
}

/// One interactive form field placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    pub rect: Rect,
    pub kind: WidgetKind,
}

/// Everything drawn for a single form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBlock {
    pub field_key: String,
    pub label: TextItem,
    pub captions: Vec<TextItem>,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPage {
    pub title: Option<TextItem>,
    pub blocks: Vec<FieldBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfPlan {
    pub title: String,
    pub pages: Vec<PdfPage>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PdfFieldError(pub String);

/// A field whose widgets could not all be created; the rest of the document is intact.
///
/// The field's label stays on the page, as does any widget placed before the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialArtifactFailure {
    /// `None` for the document title.
    pub field_key: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfReport {
    pub pages: usize,
    pub fields_created: usize,
    pub warnings: Vec<PartialArtifactFailure>,
}

/// Document writer supplied by the host (pdf library binding).
pub trait PdfFormBackend {
    fn add_page(&mut self, width: f32, height: f32);
    fn draw_text(&mut self, page: usize, item: &TextItem) -> Result<(), PdfFieldError>;
    fn create_field(&mut self, page: usize, widget: &Widget) -> Result<(), PdfFieldError>;
}

struct Cursor {
    pages: Vec<PdfPage>,
    y: f32,
}

impl Cursor {
    fn page(&mut self) -> &mut PdfPage {
        if self.pages.is_empty() {
            self.pages.push(PdfPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn break_if_needed(&mut self) {
        if self.y < PAGE_BREAK_AT {
            self.pages.push(PdfPage::default());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }
}

pub fn layout(spec: &FormSpec, values: &ValueBag) -> PdfPlan {
    let mut cursor = Cursor {
        pages: Vec::new(),
        y: PAGE_HEIGHT - MARGIN,
    };
    let title = TextItem {
        text: spec.title.clone(),
        x: MARGIN,
        y: cursor.y,
        size: TITLE_SIZE,
    };
    cursor.page().title = Some(title);
    cursor.y -= 60.0;

    for field in visible_fields(spec, values) {
        cursor.break_if_needed();
        let block = field_block(field, values.get(&field.field_key), &mut cursor.y);
        cursor.page().blocks.push(block);
    }

    PdfPlan {
        title: spec.title.clone(),
        pages: cursor.pages,
    }
}

fn text_box(name: String, y: f32, height: f32, value: Option<String>, multiline: bool) -> Widget {
    Widget {
        name,
        rect: Rect {
            x: MARGIN,
            y: y - height,
            width: BOX_WIDTH,
            height,
        },
        kind: WidgetKind::TextBox { value, multiline },
    }
}

fn caption(text: &str, x: f32, y: f32) -> TextItem {
    TextItem {
        text: text.to_string(),
        x,
        y,
        size: CAPTION_SIZE,
    }
}

fn field_block(field: &FieldDefinition, value: Option<&FieldValue>, y: &mut f32) -> FieldBlock {
    let key = &field.field_key;
    let mut label_text = field.display_label().to_string();
    if field.is_required() {
        label_text.push_str(" *");
    }
    let label = TextItem {
        text: label_text,
        x: MARGIN,
        y: *y,
        size: LABEL_SIZE,
    };
    *y -= ROW_HEIGHT;

    let text = value.and_then(FieldValue::as_text).map(str::to_string);
    let mut captions = Vec::new();
    let mut widgets = Vec::new();

    match field.kind {
        FieldType::Text | FieldType::Currency => {
            widgets.push(text_box(format!("text_{key}"), *y, ROW_HEIGHT, text, false));
            *y -= 45.0;
        }
        FieldType::MultilineText => {
            widgets.push(text_box(format!("text_{key}"), *y, 60.0, text, true));
            *y -= 80.0;
        }
        FieldType::Select | FieldType::RegionCode => {
            let options = field.effective_options();
            let selected = text.filter(|choice| options.contains(choice));
            widgets.push(Widget {
                name: format!("select_{key}"),
                rect: Rect {
                    x: MARGIN,
                    y: *y - ROW_HEIGHT,
                    width: DROPDOWN_WIDTH,
                    height: ROW_HEIGHT,
                },
                kind: WidgetKind::Dropdown { options, selected },
            });
            *y -= 45.0;
        }
        FieldType::Radio => {
            let mut buttons = Vec::new();
            for (index, option) in field.options.iter().enumerate() {
                let option_y = *y - index as f32 * ROW_HEIGHT;
                captions.push(caption(option, 80.0, option_y - 5.0));
                buttons.push((option.clone(), toggle_rect(option_y)));
            }
            let selected = text.filter(|choice| field.options.contains(choice));
            widgets.push(Widget {
                name: format!("radio_{key}"),
                rect: Rect {
                    x: 55.0,
                    y: *y - field.options.len() as f32 * ROW_HEIGHT,
                    width: BOX_WIDTH,
                    height: field.options.len() as f32 * ROW_HEIGHT,
                },
                kind: WidgetKind::RadioGroup { buttons, selected },
            });
            *y -= field.options.len() as f32 * ROW_HEIGHT + 20.0;
        }
        FieldType::MultiSelect => {
            let chosen = value.and_then(FieldValue::as_list).unwrap_or_default();
            for (index, option) in field.options.iter().enumerate() {
                let option_y = *y - index as f32 * ROW_HEIGHT;
                captions.push(caption(option, 80.0, option_y - 5.0));
                widgets.push(Widget {
                    name: format!("check_{key}_{index}"),
                    rect: toggle_rect(option_y),
                    kind: WidgetKind::CheckBox {
                        checked: chosen.contains(option),
                    },
                });
            }
            *y -= field.options.len() as f32 * ROW_HEIGHT + 20.0;
        }
        FieldType::DynamicList => {
            let entries = match value.and_then(FieldValue::as_list) {
                Some(items) if !items.is_empty() => items.to_vec(),
                _ => vec![String::new()],
            };
            for (index, entry) in entries.into_iter().enumerate() {
                let prefill = Some(entry).filter(|entry| !entry.is_empty());
                let name = format!("list_{key}_{index}");
                widgets.push(text_box(name, *y, ROW_HEIGHT, prefill, false));
                *y -= 35.0;
            }
            *y -= 10.0;
        }
        FieldType::Address => {
            let address = match value {
                Some(FieldValue::Address(address)) => Some(address),
                _ => None,
            };
            let parts = [
                ("street", "Street", address.and_then(|a| a.street.clone())),
                ("city", "City", address.and_then(|a| a.city.clone())),
                ("zip", "ZIP", address.and_then(|a| a.zip.clone())),
            ];
            for (part, title, prefill) in parts {
                captions.push(caption(title, MARGIN + BOX_WIDTH + 10.0, *y - 17.0));
                let name = format!("address_{key}_{part}");
                widgets.push(text_box(name, *y, ROW_HEIGHT, prefill, false));
                *y -= 35.0;
            }
            *y -= 10.0;
        }
    }

    FieldBlock {
        field_key: key.clone(),
        label,
        captions,
        widgets,
    }
}

fn toggle_rect(option_y: f32) -> Rect {
    Rect {
        x: 55.0,
        y: option_y - 8.0,
        width: TOGGLE_SIZE,
        height: TOGGLE_SIZE,
    }
}

/// Replays a plan through the backend, isolating failures per field.
pub fn render_pdf<B: PdfFormBackend + ?Sized>(plan: &PdfPlan, backend: &mut B) -> PdfReport {
    let mut report = PdfReport::default();

    for (index, page) in plan.pages.iter().enumerate() {
        backend.add_page(PAGE_WIDTH, PAGE_HEIGHT);
        report.pages += 1;

        if let Some(title) = &page.title
            && let Err(err) = backend.draw_text(index, title)
        {
            tracing::warn!(error = %err, "failed to draw document title");
            report.warnings.push(PartialArtifactFailure {
                field_key: None,
                reason: err.to_string(),
            });
        }

        for block in &page.blocks {
            if let Err(err) = draw_block(backend, index, block, &mut report.fields_created) {
                tracing::warn!(field = %block.field_key, error = %err, "error creating field");
                report.warnings.push(PartialArtifactFailure {
                    field_key: Some(block.field_key.clone()),
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        pages = report.pages,
        fields = report.fields_created,
        warnings = report.warnings.len(),
        "pdf form assembled"
    );
    report
}

/// Stops at the first failing widget. Text and widgets already placed stay on
/// the page and are counted in `created`.
fn draw_block<B: PdfFormBackend + ?Sized>(
    backend: &mut B,
    page: usize,
    block: &FieldBlock,
    created: &mut usize,
) -> Result<(), PdfFieldError> {
    backend.draw_text(page, &block.label)?;
    for item in &block.captions {
        backend.draw_text(page, item)?;
    }
    for widget in &block.widgets {
        backend.create_field(page, widget)?;
        *created += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_buttons_step_down_per_option() {
        let field = FieldDefinition::new("size", FieldType::Radio).with_options(["S", "M", "L"]);
        let mut y = 700.0;
        let block = field_block(&field, None, &mut y);
        assert_eq!(y, 700.0 - ROW_HEIGHT - 3.0 * ROW_HEIGHT - 20.0);
        let WidgetKind::RadioGroup { buttons, selected } = &block.widgets[0].kind else {
            panic!("expected radio group");
        };
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[1].1.y, 675.0 - ROW_HEIGHT - 8.0);
        assert!(selected.is_none());
    }

    #[test]
    fn dropdown_ignores_unknown_selection() {
        let field = FieldDefinition::new("pick", FieldType::Select).with_options(["a", "b"]);
        let mut y = 700.0;
        let block = field_block(&field, Some(&FieldValue::from("z")), &mut y);
        assert!(matches!(
            &block.widgets[0].kind,
            WidgetKind::Dropdown { selected: None, .. }
        ));
    }
}
