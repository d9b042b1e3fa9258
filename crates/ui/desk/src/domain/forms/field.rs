//! Form field kinds & metadata.
//!
//! Purely declarative. Editing behaviour lives in `components::form_view`,
//! validation in `validation.rs` / `age.rs`.

/// One entry of a select field. `value` is what gets posted, `label` what is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Label of the empty placeholder entry the server-rendered selects start with.
    pub const PLACEHOLDER: &'static str = "---------";

    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new("", Self::PLACEHOLDER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

/// Supported input kinds.
///
/// Notes:
/// - Text / Multiline / Number / Date render as single-line editors
/// - Select cycles through its options with Left/Right
#[derive(Debug, Clone)]
pub enum FormFieldKind {
    Text,
    Multiline,
    Number,
    Date,
    Select { options: Vec<SelectOption> },
}

/// Declarative description of a form field.
#[derive(Debug, Clone)]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub kind: FormFieldKind,
    pub help: Option<String>,
}

impl FormField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FormFieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            help: None,
        }
    }

    /// Attach optional help / hint text shown beneath the field.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Return true if this field uses a textual editor when focused.
    pub fn is_textual(&self) -> bool {
        !matches!(self.kind, FormFieldKind::Select { .. })
    }

    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            FormFieldKind::Select { options } => options,
            _ => &[],
        }
    }
}
