//! Dashboard variable types

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value::SelectedValue;

/// What kind of variable this is, carrying only the fields that kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum VariableKind {
    /// Free text typed by the user. Has no option list.
    Textbox,
    /// A fixed, comma-separated list of options.
    Custom {
        /// The literal comma-separated list.
        #[serde(rename = "customValue", default)]
        custom_value: String,
    },
    /// Options fetched by running a query template.
    Query {
        /// The query template, possibly referencing other variables.
        #[serde(rename = "queryValue", default)]
        query_value: String,
    },
}

impl VariableKind {
    /// Returns a short label for logs and display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Textbox => "TEXTBOX",
            Self::Custom { .. } => "CUSTOM",
            Self::Query { .. } => "QUERY",
        }
    }

    /// Returns the query template for query variables.
    #[must_use]
    pub fn query_value(&self) -> Option<&str> {
        match self {
            Self::Query { query_value } => Some(query_value),
            _ => None,
        }
    }
}

/// Ordering applied to option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// Keep the order the values arrived in.
    #[default]
    #[serde(rename = "DISABLED")]
    Disabled,
    /// Ascending natural order.
    #[serde(rename = "ASC")]
    Ascending,
    /// Descending natural order.
    #[serde(rename = "DESC")]
    Descending,
}

/// A named, user-adjustable dashboard parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVariable {
    /// Unique name within the dashboard; the `{{.name}}` key.
    pub name: String,

    /// Free text shown next to the variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Kind-specific definition.
    #[serde(flatten)]
    pub kind: VariableKind,

    /// Ordering of the option list.
    #[serde(default)]
    pub sort: SortOrder,

    /// Whether several values may be selected.
    #[serde(default)]
    pub multi_select: bool,

    /// Whether the ALL choice is offered (multi-select only).
    #[serde(default, rename = "showALLOption")]
    pub show_all_option: bool,

    /// Current external selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_value: Option<SelectedValue>,

    /// True when the user's intent is "every current option".
    #[serde(default)]
    pub all_selected: bool,
}

impl DashboardVariable {
    fn with_kind(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            sort: SortOrder::Disabled,
            multi_select: false,
            show_all_option: false,
            selected_value: None,
            all_selected: false,
        }
    }

    /// Creates a free-text variable.
    #[must_use]
    pub fn textbox(name: impl Into<String>) -> Self {
        Self::with_kind(name, VariableKind::Textbox)
    }

    /// Creates a variable with a fixed comma-separated option list.
    #[must_use]
    pub fn custom(name: impl Into<String>, custom_value: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            VariableKind::Custom {
                custom_value: custom_value.into(),
            },
        )
    }

    /// Creates a variable whose options come from a query.
    #[must_use]
    pub fn query(name: impl Into<String>, query_value: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            VariableKind::Query {
                query_value: query_value.into(),
            },
        )
    }

    /// Sets the option ordering.
    #[must_use]
    pub const fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Enables multi-select, optionally offering the ALL choice.
    #[must_use]
    pub const fn with_multi_select(mut self, show_all_option: bool) -> Self {
        self.multi_select = true;
        self.show_all_option = show_all_option;
        self
    }

    /// Sets the current selection.
    #[must_use]
    pub fn with_selected(mut self, value: impl Into<Option<SelectedValue>>) -> Self {
        self.selected_value = value.into();
        self
    }

    /// Sets the all-selected flag.
    #[must_use]
    pub const fn with_all_selected(mut self, all_selected: bool) -> Self {
        self.all_selected = all_selected;
        self
    }

    /// Checks structural validity of the definition.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidVariable`] when the name is blank.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidVariable(
                "variable name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read-only snapshot of every variable in a dashboard, keyed by name.
///
/// Deserializes from a JSON object whose keys must equal each variable's
/// `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExistingVariables {
    variables: HashMap<String, DashboardVariable>,
}

impl ExistingVariables {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable, keyed by its name.
    #[must_use]
    pub fn with(mut self, variable: DashboardVariable) -> Self {
        self.variables.insert(variable.name.clone(), variable);
        self
    }

    /// Gets a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DashboardVariable> {
        self.variables.get(name)
    }

    /// Gets the current selection of a variable by name.
    #[must_use]
    pub fn selected_value(&self, name: &str) -> Option<&SelectedValue> {
        self.get(name).and_then(|v| v.selected_value.as_ref())
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if the snapshot holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Every variable's selection as JSON, for query execution payloads.
    /// Variables with no selection map to `null`.
    #[must_use]
    pub fn payload_variables(&self) -> BTreeMap<String, serde_json::Value> {
        self.variables
            .iter()
            .map(|(name, variable)| {
                let value = variable
                    .selected_value
                    .as_ref()
                    .map_or(serde_json::Value::Null, SelectedValue::to_json);
                (name.clone(), value)
            })
            .collect()
    }
}

impl TryFrom<HashMap<String, DashboardVariable>> for ExistingVariables {
    type Error = DomainError;

    fn try_from(variables: HashMap<String, DashboardVariable>) -> DomainResult<Self> {
        if let Some((key, variable)) = variables.iter().find(|(key, v)| **key != v.name) {
            return Err(DomainError::InvalidVariable(format!(
                "variable under key '{key}' is named '{}'",
                variable.name
            )));
        }
        Ok(Self { variables })
    }
}

impl<'de> Deserialize<'de> for ExistingVariables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let variables = HashMap::<String, DashboardVariable>::deserialize(deserializer)?;
        Self::try_from(variables).map_err(serde::de::Error::custom)
    }
}

impl FromIterator<DashboardVariable> for ExistingVariables {
    fn from_iter<T: IntoIterator<Item = DashboardVariable>>(iter: T) -> Self {
        Self {
            variables: iter.into_iter().map(|v| (v.name.clone(), v)).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::value::VariableValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_query_variable() {
        let json = r#"{
            "name": "service",
            "type": "QUERY",
            "queryValue": "SELECT service FROM spans WHERE env = {{.env}}",
            "sort": "ASC",
            "multiSelect": true,
            "showALLOption": true,
            "selectedValue": ["api", "web"],
            "allSelected": false
        }"#;

        let variable: DashboardVariable = serde_json::from_str(json).unwrap();
        assert_eq!(variable.name, "service");
        assert_eq!(
            variable.kind.query_value(),
            Some("SELECT service FROM spans WHERE env = {{.env}}")
        );
        assert_eq!(variable.sort, SortOrder::Ascending);
        assert!(variable.multi_select);
        assert!(variable.show_all_option);
        assert_eq!(
            variable.selected_value,
            Some(SelectedValue::Multiple(vec!["api".into(), "web".into()]))
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"name": "env", "type": "CUSTOM", "customValue": "dev,prod"}"#;
        let variable: DashboardVariable = serde_json::from_str(json).unwrap();
        assert_eq!(
            variable.kind,
            VariableKind::Custom {
                custom_value: "dev,prod".to_string()
            }
        );
        assert_eq!(variable.sort, SortOrder::Disabled);
        assert!(!variable.multi_select);
        assert!(variable.selected_value.is_none());
        assert!(!variable.all_selected);
    }

    #[test]
    fn test_serialize_uses_dashboard_field_names() {
        let variable = DashboardVariable::textbox("host")
            .with_selected(SelectedValue::Single("db-1".into()));
        let json = serde_json::to_value(&variable).unwrap();
        assert_eq!(json["type"], "TEXTBOX");
        assert_eq!(json["selectedValue"], "db-1");
        assert_eq!(json["showALLOption"], false);
        assert_eq!(json["sort"], "DISABLED");
    }

    #[test]
    fn test_existing_variables_keyed_by_name() {
        let existing: ExistingVariables = serde_json::from_str(
            r#"{"env": {"name": "env", "type": "CUSTOM", "customValue": "dev,prod"}}"#,
        )
        .unwrap();
        assert!(existing.get("env").is_some());

        let mismatched = serde_json::from_str::<ExistingVariables>(
            r#"{"environment": {"name": "env", "type": "TEXTBOX"}}"#,
        );
        let message = mismatched.unwrap_err().to_string();
        assert!(message.contains("'environment'"), "{message}");
        assert!(message.contains("'env'"), "{message}");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(DashboardVariable::textbox("  ").validate().is_err());
        assert!(DashboardVariable::textbox("host").validate().is_ok());
    }

    #[test]
    fn test_payload_variables() {
        let existing = ExistingVariables::new()
            .with(
                DashboardVariable::custom("env", "dev,prod")
                    .with_selected(SelectedValue::Single("prod".into())),
            )
            .with(DashboardVariable::textbox("host"))
            .with(
                DashboardVariable::custom("port", "80,443")
                    .with_selected(SelectedValue::Multiple(vec![VariableValue::Number(443.0)])),
            );

        let payload = existing.payload_variables();
        assert_eq!(payload["env"], serde_json::json!("prod"));
        assert_eq!(payload["host"], serde_json::Value::Null);
        assert_eq!(payload["port"], serde_json::json!([443.0]));
    }

    #[test]
    fn test_snapshot_from_iter() {
        let existing: ExistingVariables = vec![
            DashboardVariable::textbox("a"),
            DashboardVariable::textbox("b"),
        ]
        .into_iter()
        .collect();
        assert_eq!(existing.len(), 2);
        assert!(existing.get("a").is_some());
        assert!(existing.selected_value("a").is_none());
    }
}
