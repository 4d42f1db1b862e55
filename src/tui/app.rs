//! Application state for the TUI.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::catalog::store::InstrumentStore;
use crate::catalog::{Catalog, SaveStatus};
use crate::models::{FALLBACK_INSTRUMENT, InstrumentDefinition};
use crate::sizing::input::{RiskMode, SizingForm, instrument_field_text, parse_amount};
use crate::sizing::{CalculationResult, RoundingPolicy, TradingParameters, calculate};
use crate::{LotsizerError, Result, ValidationError};

use super::input::TextInput;

/// How long a status message stays visible.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Catalog type driven by the UI; the store is chosen at startup.
pub type AppCatalog = Catalog<Box<dyn InstrumentStore>>;

/// Central application state container.
pub struct App {
    // -- Tab State --
    pub tabs: Vec<Tab>,
    pub active_tab: usize,

    // -- Core --
    pub catalog: AppCatalog,
    /// Rounding policy fixed for this deployment.
    pub policy: RoundingPolicy,

    // -- Calculator State --
    pub selected_instrument: String,
    pub form: CalculatorForm,
    /// Latest calculation outcome, refreshed after every edit.
    pub outcome: Outcome,

    // -- Instruments State --
    /// Highlighted row in the instrument list.
    pub instrument_cursor: usize,
    /// Add/edit dialog, when open.
    pub editor: Option<InstrumentEditor>,
    /// Instrument awaiting delete/reset confirmation.
    pub pending_removal: Option<String>,

    // -- UI State --
    pub mode: Mode,
    /// Message to display (clears after timeout).
    pub message: Option<StatusMessage>,

    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates the app with `initial` selected, falling back to the
    /// default instrument when it is unknown.
    pub fn new(catalog: AppCatalog, policy: RoundingPolicy, initial: &str) -> Self {
        let mut app = Self {
            tabs: vec![Tab::Calculator, Tab::Instruments],
            active_tab: 0,
            catalog,
            policy,
            selected_instrument: String::new(),
            form: CalculatorForm::new(),
            outcome: Outcome::Incomplete,
            instrument_cursor: 0,
            editor: None,
            pending_removal: None,
            mode: Mode::Normal,
            message: None,
            should_quit: false,
        };
        app.select_instrument(initial);
        app
    }

    /// Returns the currently active tab.
    pub fn current_tab(&self) -> Tab {
        self.tabs[self.active_tab]
    }

    /// Switches to the next tab.
    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.active_tab = (self.active_tab + 1) % self.tabs.len();
        }
    }

    /// Switches to the previous tab.
    pub fn previous_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.active_tab = self
                .active_tab
                .checked_sub(1)
                .unwrap_or(self.tabs.len() - 1);
        }
    }

    /// Activates `tab` if present.
    pub fn show_tab(&mut self, tab: Tab) {
        if let Some(i) = self.tabs.iter().position(|t| *t == tab) {
            self.active_tab = i;
        }
    }

    /// Selects an instrument and loads its parameters into the form.
    ///
    /// Unknown names fall back to the default instrument, then to the
    /// first catalog entry.
    pub fn select_instrument(&mut self, name: &str) {
        let definition = match self.catalog.resolve(name) {
            Ok(def) => def.clone(),
            Err(e) => {
                warn!(error = %e, "falling back to {FALLBACK_INSTRUMENT}");
                match self
                    .catalog
                    .resolve(FALLBACK_INSTRUMENT)
                    .ok()
                    .or_else(|| self.catalog.entries().first().map(|e| &e.definition))
                {
                    Some(def) => def.clone(),
                    None => {
                        self.selected_instrument.clear();
                        self.recalculate();
                        return;
                    }
                }
            }
        };

        debug!(name = %definition.name, "instrument selected");
        self.form.fill_instrument(&definition);
        self.selected_instrument = definition.name;
        self.recalculate();
    }

    /// Selects the next (`step = 1`) or previous (`step = -1`) instrument.
    pub fn cycle_instrument(&mut self, step: isize) {
        let names = self.catalog.list_names();
        if names.is_empty() {
            return;
        }
        let current = names
            .iter()
            .position(|n| *n == self.selected_instrument)
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(names.len() as isize) as usize;
        let name = names[next].to_string();
        self.select_instrument(&name);
    }

    /// Re-runs the sizing engine on the current form contents.
    pub fn recalculate(&mut self) {
        self.outcome = match self.form.as_sizing_form().to_parameters(self.policy) {
            None => Outcome::Incomplete,
            Some(params) => match calculate(&params, self.policy) {
                Ok(Some(result)) => Outcome::Ready { params, result },
                Ok(None) => Outcome::Incomplete,
                Err(e) => Outcome::Invalid(e.to_string()),
            },
        };
    }

    /// Writes the form's cost and conversion into the catalog entry of the
    /// selected instrument.
    pub fn save_form_to_catalog(&mut self) {
        let cost = parse_amount(self.form.field(CalcField::CostPerUnit).as_str());
        let conversion = parse_amount(self.form.field(CalcField::Conversion).as_str());
        let (Some(cost), Some(conversion)) = (cost, conversion) else {
            self.show_error("cost per unit and conversion must be numbers");
            return;
        };

        let name = self.selected_instrument.clone();
        let result = self.catalog.edit_numeric_fields(&name, cost, conversion);
        self.report_mutation(&name, &format!("saved {name}"), result);
    }

    /// Row index of the highlighted instrument, clamped to the list.
    pub fn clamp_cursor(&mut self) {
        let len = self.catalog.len();
        if len == 0 {
            self.instrument_cursor = 0;
        } else if self.instrument_cursor >= len {
            self.instrument_cursor = len - 1;
        }
    }

    /// Name under the instrument list cursor.
    pub fn highlighted_instrument(&self) -> Option<&str> {
        self.catalog
            .entries()
            .get(self.instrument_cursor)
            .map(|e| e.definition.name.as_str())
    }

    /// Opens the dialog for a new instrument.
    pub fn open_add_editor(&mut self) {
        self.editor = Some(InstrumentEditor::add());
        self.mode = Mode::Insert;
    }

    /// Opens the dialog for editing the highlighted instrument.
    pub fn open_edit_editor(&mut self) {
        let Some(name) = self.highlighted_instrument().map(str::to_string) else {
            return;
        };
        if let Ok(def) = self.catalog.resolve(&name) {
            self.editor = Some(InstrumentEditor::edit(def));
            self.mode = Mode::Insert;
        }
    }

    /// Closes the dialog without applying it.
    pub fn close_editor(&mut self) {
        self.editor = None;
        self.mode = Mode::Normal;
    }

    /// Applies the open dialog to the catalog.
    ///
    /// The dialog stays open on invalid input so the user can correct it.
    pub fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };

        let (name, label, result) = match &editor.kind {
            EditorKind::Add => match editor.to_definition() {
                Ok(def) => {
                    let name = def.name.clone();
                    let result = self.catalog.add(def);
                    (name.clone(), format!("added {name}"), result)
                }
                Err(e) => (String::new(), String::new(), Err(e)),
            },
            EditorKind::Edit(name) => {
                let name = name.clone();
                match editor.numeric_pair() {
                    Ok((cost, conversion)) => {
                        let result = self.catalog.edit_numeric_fields(&name, cost, conversion);
                        (name.clone(), format!("updated {name}"), result)
                    }
                    Err(e) => (name, String::new(), Err(e)),
                }
            }
        };

        if result.is_ok() {
            self.close_editor();
        }
        self.report_mutation(&name, &label, result);
        self.clamp_cursor();
    }

    /// Asks for confirmation before deleting or resetting the highlighted
    /// instrument.
    pub fn request_removal(&mut self) {
        let Some(name) = self.highlighted_instrument().map(str::to_string) else {
            return;
        };
        if self.catalog.is_default(&name) && !self.catalog.is_shadow_of_default(&name) {
            self.show_info(format!("{name} is a built-in default with no changes"));
            return;
        }
        self.pending_removal = Some(name);
        self.mode = Mode::Confirm;
    }

    /// Carries out a confirmed removal.
    pub fn confirm_removal(&mut self) {
        self.mode = Mode::Normal;
        let Some(name) = self.pending_removal.take() else {
            return;
        };
        let label = if self.catalog.is_default(&name) {
            format!("reset {name} to default")
        } else {
            format!("deleted {name}")
        };
        let status = self.catalog.remove(&name);
        self.report_mutation(&name, &label, Ok(status));
        self.clamp_cursor();
    }

    /// Drops a pending removal.
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
        self.mode = Mode::Normal;
    }

    /// Shows the outcome of a catalog mutation on `name`.
    ///
    /// The calculator is refilled only when the mutation touched the selected
    /// instrument or the selection no longer resolves. Unsaved form edits for
    /// any other selection are left alone.
    fn report_mutation(&mut self, name: &str, label: &str, result: Result<SaveStatus>) {
        match result {
            Ok(SaveStatus::Saved) => self.show_info(label),
            Ok(SaveStatus::Unchanged) => {}
            Ok(SaveStatus::Failed(reason)) => {
                self.show_error(format!("{label} (not persisted: {reason})"));
            }
            Err(LotsizerError::NotFound(name)) => {
                self.show_error(format!("unknown instrument {name}"));
            }
            Err(e) => {
                self.show_error(e.to_string());
                return;
            }
        }
        let selected = self.selected_instrument.clone();
        if name == selected || !self.catalog.contains(&selected) {
            self.select_instrument(&selected);
        } else {
            self.recalculate();
        }
    }

    /// Sets an error message to display.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: message.into(),
            is_error: true,
            timestamp: Instant::now(),
        });
    }

    /// Sets an informational message to display.
    pub fn show_info(&mut self, message: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: message.into(),
            is_error: false,
            timestamp: Instant::now(),
        });
    }

    /// Clears messages older than the display timeout.
    pub fn clear_stale_messages(&mut self) {
        if let Some(ref message) = self.message
            && message.timestamp.elapsed() > MESSAGE_TIMEOUT
        {
            self.message = None;
        }
    }
}

/// Tab types in the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Calculator,
    Instruments,
}

impl Tab {
    /// Returns the display title for the tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Calculator => "Calculator",
            Tab::Instruments => "Instruments",
        }
    }
}

/// Input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Confirm,
}

/// Result of the last recalculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Some input is missing or not positive.
    Incomplete,
    /// A recommendation is available.
    Ready {
        params: TradingParameters,
        result: CalculationResult,
    },
    /// Inputs were complete but rejected.
    Invalid(String),
}

/// Editable fields of the calculator, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalcField {
    Capital,
    Risk,
    StopLoss,
    CostPerUnit,
    Conversion,
    LotSize,
}

impl CalcField {
    pub const ALL: [CalcField; 6] = [
        Self::Capital,
        Self::Risk,
        Self::StopLoss,
        Self::CostPerUnit,
        Self::Conversion,
        Self::LotSize,
    ];

    /// Returns the field label.
    pub fn label(self, risk_mode: RiskMode) -> &'static str {
        match self {
            Self::Capital => "Capital ($)",
            Self::Risk => risk_mode.label(),
            Self::StopLoss => "Stop loss (points)",
            Self::CostPerUnit => "Dollar cost per unit ($)",
            Self::Conversion => "Unit-to-volume conversion",
            Self::LotSize => "Standard lot size",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Text fields of the calculator.
#[derive(Clone, Debug)]
pub struct CalculatorForm {
    pub risk_mode: RiskMode,
    pub inputs: [TextInput; 6],
    pub selected: CalcField,
}

impl CalculatorForm {
    /// Creates the form with a sample capital and risk.
    pub fn new() -> Self {
        let mut inputs: [TextInput; 6] = Default::default();
        inputs[CalcField::Capital.index()].set("5000");
        inputs[CalcField::Risk.index()].set("1");
        inputs[CalcField::StopLoss.index()].set("12");
        Self {
            risk_mode: RiskMode::default(),
            inputs,
            selected: CalcField::Capital,
        }
    }

    pub fn field(&self, field: CalcField) -> &TextInput {
        &self.inputs[field.index()]
    }

    pub fn field_mut(&mut self, field: CalcField) -> &mut TextInput {
        &mut self.inputs[field.index()]
    }

    /// The field under the cursor.
    pub fn selected_input(&mut self) -> &mut TextInput {
        let field = self.selected;
        self.field_mut(field)
    }

    /// Moves the selection down one field, wrapping at the end.
    pub fn select_next(&mut self) {
        let i = (self.selected.index() + 1) % CalcField::ALL.len();
        self.selected = CalcField::ALL[i];
    }

    /// Moves the selection up one field, wrapping at the start.
    pub fn select_previous(&mut self) {
        let i = self
            .selected
            .index()
            .checked_sub(1)
            .unwrap_or(CalcField::ALL.len() - 1);
        self.selected = CalcField::ALL[i];
    }

    /// Loads an instrument's economics into the instrument fields.
    pub fn fill_instrument(&mut self, instrument: &InstrumentDefinition) {
        let [cost, conversion, lot] = instrument_field_text(instrument);
        self.field_mut(CalcField::CostPerUnit).set(cost);
        self.field_mut(CalcField::Conversion).set(conversion);
        self.field_mut(CalcField::LotSize).set(lot);
    }

    /// Borrowed view for the sizing engine's input parser.
    pub fn as_sizing_form(&self) -> SizingForm<'_> {
        SizingForm {
            risk_mode: self.risk_mode,
            capital: self.field(CalcField::Capital).as_str(),
            risk: self.field(CalcField::Risk).as_str(),
            stop_loss_points: self.field(CalcField::StopLoss).as_str(),
            dollar_cost_per_unit: self.field(CalcField::CostPerUnit).as_str(),
            unit_to_volume_conversion: self.field(CalcField::Conversion).as_str(),
            standard_lot_size: self.field(CalcField::LotSize).as_str(),
        }
    }
}

impl Default for CalculatorForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the dialog creates or edits an instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorKind {
    Add,
    Edit(String),
}

/// Add/edit instrument dialog state.
#[derive(Clone, Debug)]
pub struct InstrumentEditor {
    pub kind: EditorKind,
    /// `(label, input)` pairs in display order.
    pub fields: Vec<(&'static str, TextInput)>,
    pub selected: usize,
}

impl InstrumentEditor {
    /// Empty dialog for a new instrument.
    pub fn add() -> Self {
        Self {
            kind: EditorKind::Add,
            fields: vec![
                ("Name", TextInput::new()),
                ("Dollar cost per unit", TextInput::new()),
                ("Unit-to-volume conversion", TextInput::new()),
                ("Standard lot size", TextInput::new()),
            ],
            selected: 0,
        }
    }

    /// Dialog pre-filled with the editable fields of `instrument`.
    pub fn edit(instrument: &InstrumentDefinition) -> Self {
        let [cost, conversion, _] = instrument_field_text(instrument);
        Self {
            kind: EditorKind::Edit(instrument.name.clone()),
            fields: vec![
                ("Dollar cost per unit", TextInput::with_content(cost)),
                ("Unit-to-volume conversion", TextInput::with_content(conversion)),
            ],
            selected: 0,
        }
    }

    /// Dialog title.
    pub fn title(&self) -> String {
        match &self.kind {
            EditorKind::Add => " Add Instrument ".to_string(),
            EditorKind::Edit(name) => format!(" Edit {name} "),
        }
    }

    pub fn selected_input(&mut self) -> Option<&mut TextInput> {
        self.fields.get_mut(self.selected).map(|(_, input)| input)
    }

    pub fn select_next(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + 1) % self.fields.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.fields.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.fields.len() - 1);
        }
    }

    fn amount(&self, index: usize) -> Result<rust_decimal::Decimal> {
        let (field, input) = &self.fields[index];
        parse_amount(input.as_str())
            .ok_or_else(|| ValidationError::NotANumber { field: *field }.into())
    }

    /// Parses an add dialog into a definition (validated by the catalog).
    fn to_definition(&self) -> Result<InstrumentDefinition> {
        Ok(InstrumentDefinition::new(
            self.fields[0].1.as_str().trim(),
            self.amount(1)?,
            self.amount(2)?,
            self.amount(3)?,
        ))
    }

    /// Parses an edit dialog into `(cost, conversion)`.
    fn numeric_pair(&self) -> Result<(rust_decimal::Decimal, rust_decimal::Decimal)> {
        Ok((self.amount(0)?, self.amount(1)?))
    }
}

/// Transient message for the status bar.
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    /// When the message was shown.
    pub timestamp: Instant,
}
