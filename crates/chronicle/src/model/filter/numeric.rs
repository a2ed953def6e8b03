//! Numeric comparison filter.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{json, Map, Number, Value};

use chronicle_core::Notifier;

use super::FilterModel;
use crate::error::SelectionError;
use crate::model::selection::{SelectionConfig, SelectionModel, SelectionOption};

/// The comparison applied between the filtered field and the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl ComparisonOperator {
    /// All operators, in display order.
    pub const ALL: [ComparisonOperator; 5] = [
        ComparisonOperator::Lt,
        ComparisonOperator::Le,
        ComparisonOperator::Eq,
        ComparisonOperator::Ge,
        ComparisonOperator::Gt,
    ];
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Gt => ">",
        };
        f.write_str(symbol)
    }
}

/// Options for [`NumericComparisonFilterModel::new`].
#[derive(Debug, Clone)]
pub struct NumericFilterOptions {
    /// Use the operator symbol as the key of the normalized object
    /// (`{"<": 5}`) instead of the explicit `{"operator": "<", "limit": 5}`
    /// shape.
    pub operator_as_key: bool,
    /// Multiplier applied to the parsed operand before normalization, for
    /// fields stored in a different unit than the one typed.
    pub scale: f64,
    /// Round the scaled operand and normalize it as an integer.
    pub integer: bool,
}

impl Default for NumericFilterOptions {
    fn default() -> Self {
        Self {
            operator_as_key: false,
            scale: 1.0,
            integer: false,
        }
    }
}

/// Filters a numeric field against an operand under a selectable operator.
///
/// The operand follows commit-on-blur semantics like the text filters. The
/// operator is a single-selection model; changing it while an operand is
/// present changes the filtering criteria and fires the primary channel,
/// while changing it with no operand is a visual change only.
pub struct NumericComparisonFilterModel {
    operator: Arc<SelectionModel<ComparisonOperator>>,
    pending: Mutex<String>,
    operand: Mutex<Option<f64>>,
    options: NumericFilterOptions,
    notifier: Arc<Notifier>,
    visual_change: Arc<Notifier>,
}

impl NumericComparisonFilterModel {
    /// Creates a filter defaulting to the `=` operator and no operand.
    pub fn new(options: NumericFilterOptions) -> Arc<Self> {
        Self::with_default_operator(ComparisonOperator::Eq, options)
            .expect("a non-empty default operator is always provided")
    }

    /// Creates a filter with the given default operator.
    pub fn with_default_operator(
        default_operator: ComparisonOperator,
        options: NumericFilterOptions,
    ) -> Result<Arc<Self>, SelectionError> {
        let operator = SelectionModel::new(SelectionConfig {
            available: ComparisonOperator::ALL
                .into_iter()
                .map(SelectionOption::new)
                .collect::<Vec<_>>()
                .into(),
            default_selection: vec![SelectionOption::new(default_operator)],
            multiple: false,
            allow_empty: false,
        })?;

        let model = Arc::new(Self {
            operator,
            pending: Mutex::new(String::new()),
            operand: Mutex::new(None),
            options,
            notifier: Arc::new(Notifier::new()),
            visual_change: Arc::new(Notifier::new()),
        });

        // An operator switch only alters the criteria once an operand exists;
        // until then it is a presentation change.
        let weak: Weak<Self> = Arc::downgrade(&model);
        model.operator.notifier().observe(move || {
            if let Some(model) = weak.upgrade() {
                if model.operand.lock().is_some() {
                    model.notifier.notify();
                } else {
                    model.visual_change.notify();
                }
            }
        });

        Ok(model)
    }

    /// The operator selection model, for binding to a dropdown.
    pub fn operator(&self) -> &Arc<SelectionModel<ComparisonOperator>> {
        &self.operator
    }

    /// The currently selected operator.
    pub fn current_operator(&self) -> ComparisonOperator {
        self.operator.current()
    }

    /// The pending, not yet committed operand input.
    pub fn raw(&self) -> String {
        self.pending.lock().clone()
    }

    /// The committed operand, if a valid number has been committed.
    pub fn operand(&self) -> Option<f64> {
        *self.operand.lock()
    }

    /// Updates the pending operand input and reports a visual change.
    pub fn set_raw(&self, input: impl Into<String>) {
        *self.pending.lock() = input.into();
        self.visual_change.notify();
    }

    /// Commits the pending operand input.
    ///
    /// An input that does not parse as a number keeps the previous committed
    /// operand; an empty input clears it. Notifies only when the committed
    /// operand actually changes.
    pub fn commit(&self) {
        let pending = self.pending.lock().clone();
        let trimmed = pending.trim();

        let parsed = if trimmed.is_empty() {
            None
        } else {
            match trimmed.parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::debug!(
                        target: "chronicle::filter",
                        input = %trimmed,
                        "operand does not parse as a number, keeping previous value"
                    );
                    return;
                }
            }
        };

        let changed = {
            let mut operand = self.operand.lock();
            if *operand == parsed {
                false
            } else {
                *operand = parsed;
                true
            }
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// Sets and commits an operand in one step.
    pub fn set_operand(&self, value: f64) {
        *self.pending.lock() = value.to_string();
        self.commit();
    }

    fn normalized_operand(&self, operand: f64) -> Value {
        let scaled = operand * self.options.scale;
        if self.options.integer {
            Value::Number(Number::from(scaled.round() as i64))
        } else {
            Number::from_f64(scaled).map(Value::Number).unwrap_or(Value::Null)
        }
    }
}

impl FilterModel for NumericComparisonFilterModel {
    fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    fn visual_change(&self) -> &Arc<Notifier> {
        &self.visual_change
    }

    fn is_empty(&self) -> bool {
        self.operand.lock().is_none()
    }

    fn normalized(&self) -> Value {
        let Some(operand) = *self.operand.lock() else {
            return Value::Object(Map::new());
        };
        let operator = self.operator.current();
        let operand = self.normalized_operand(operand);
        if self.options.operator_as_key {
            json!({ (operator.to_string()): operand })
        } else {
            json!({ "operator": operator.to_string(), "limit": operand })
        }
    }

    fn reset(&self) {
        self.pending.lock().clear();
        *self.operand.lock() = None;
        self.operator.reset();
    }
}
