//! Action definitions, per-device action handles, and dispatch.
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::ActionCache;
use crate::config::Attributes;
use crate::device::Device;
use crate::error::{ConnectablesError, Result, TemplateError};
use crate::exec::Launcher;
use crate::config::format::value_kind;
use crate::template::{render_text, substitute};

/// Rank given to actions that do not declare one.
pub const DEFAULT_RANK: i64 = 20;

/// Display name given to actions that do not declare one.
pub const DEFAULT_NAME: &str = "Unknown";

/// Icon given to actions that do not declare one.
pub const DEFAULT_ICON: &str = "system-run";

/// What an action does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Run a shell command line built from the `cmd` template.
    Command,
    /// Open the URI built from the `uri` template.
    Uri,
    /// Any other `type`, including the default `unknown`. Activation is a no-op.
    Other(String),
}

impl ActionKind {
    fn parse(s: &str) -> Self {
        match s {
            "command" => Self::Command,
            "uri" => Self::Uri,
            other => Self::Other(other.to_string()),
        }
    }

    /// The `type` string as written in the action file.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Command => "command",
            Self::Uri => "uri",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully defaulted action definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDefinition {
    /// Dispatch kind (`type`).
    pub kind: ActionKind,
    /// Display name.
    pub name: String,
    /// Description template, rendered against the device's attributes.
    pub descr: String,
    /// Ranking hint; higher ranks sort first.
    pub rank: i64,
    /// Icon name for the host's icon lookup.
    pub icon_name: String,
    /// Extra environment variables for `command` actions.
    pub env: BTreeMap<String, String>,
    /// Command-line template for `command` actions.
    pub cmd: Option<String>,
    /// URI template for `uri` actions.
    pub uri: Option<String>,
    /// Keys not recognised above.
    pub extra: Attributes,
}

/// Double every `%` so arbitrary text survives template rendering verbatim.
fn escape_template(text: &str) -> String {
    text.replace('%', "%%")
}

impl ActionDefinition {
    /// The definition used when the action file for `action` is missing.
    ///
    /// Its description names the action so the gap is visible to the user.
    #[must_use]
    pub fn defaults(action: &str) -> Self {
        Self {
            kind: ActionKind::Other("unknown".to_string()),
            name: DEFAULT_NAME.to_string(),
            descr: escape_template(&format!(
                "Seems an action file {action}.yaml is missing"
            )),
            rank: DEFAULT_RANK,
            icon_name: DEFAULT_ICON.to_string(),
            env: BTreeMap::new(),
            cmd: None,
            uri: None,
            extra: Attributes::new(),
        }
    }

    /// The definition used when the action file exists but cannot be used.
    #[must_use]
    pub fn unreadable(action: &str, reason: &str) -> Self {
        Self {
            descr: escape_template(&format!("Action file {action} is invalid: {reason}")),
            ..Self::defaults(action)
        }
    }

    /// Merge a parsed action mapping over the defaults, field by field.
    ///
    /// A known field with the wrong type keeps its default and adds one
    /// diagnostic to the returned list; the other fields still apply.
    /// Scalar `env` values are rendered as text (`PORT: 22` becomes `"22"`).
    /// A `null` field counts as absent.
    #[must_use]
    pub fn from_mapping(action: &str, data: &Attributes) -> (Self, Vec<String>) {
        let mut def = Self::defaults(action);
        let mut problems = Vec::new();
        for (key, value) in data {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "type" => {
                    if let Some(kind) = text_field(key, value, &mut problems) {
                        def.kind = ActionKind::parse(&kind);
                    }
                }
                "name" => {
                    if let Some(name) = text_field(key, value, &mut problems) {
                        def.name = name;
                    }
                }
                "descr" => {
                    if let Some(descr) = text_field(key, value, &mut problems) {
                        def.descr = descr;
                    }
                }
                "icon_name" => {
                    if let Some(icon) = text_field(key, value, &mut problems) {
                        def.icon_name = icon;
                    }
                }
                "cmd" => def.cmd = text_field(key, value, &mut problems),
                "uri" => def.uri = text_field(key, value, &mut problems),
                "rank" => match value.as_i64() {
                    Some(rank) => def.rank = rank,
                    None => problems.push(wrong_type(key, "an integer", value)),
                },
                "env" => def.env = env_field(value, &mut problems),
                _ => {
                    def.extra.insert(key.clone(), value.clone());
                }
            }
        }
        (def, problems)
    }
}

fn wrong_type(key: &str, expected: &str, value: &Value) -> String {
    format!("'{key}' must be {expected}, found {}", value_kind(value))
}

fn text_field(key: &str, value: &Value, problems: &mut Vec<String>) -> Option<String> {
    let text = value.as_str().map(String::from);
    if text.is_none() {
        problems.push(wrong_type(key, "a string", value));
    }
    text
}

/// Scalars become strings; nested values are dropped with a diagnostic.
fn env_field(value: &Value, problems: &mut Vec<String>) -> BTreeMap<String, String> {
    let Some(map) = value.as_object() else {
        problems.push(wrong_type("env", "a mapping", value));
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(name, value)| match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                Some((name.clone(), render_text(value)))
            }
            _ => {
                problems.push(wrong_type(&format!("env.{name}"), "a scalar", value));
                None
            }
        })
        .collect()
}

/// The outcome of activating an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A command line was handed to the launcher.
    Command {
        /// Substituted command line.
        cmdline: String,
        /// Extra environment for the child process.
        env: BTreeMap<String, String>,
    },
    /// A URI was handed to the opener.
    Uri {
        /// Substituted URI.
        uri: String,
    },
    /// The action's type has no dispatch behaviour.
    Ignored {
        /// The unrecognised `type`.
        kind: String,
    },
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { cmdline, .. } => write!(f, "run: {cmdline}"),
            Self::Uri { uri } => write!(f, "open: {uri}"),
            Self::Ignored { kind } => write!(f, "ignored (type '{kind}')"),
        }
    }
}

/// One action bound to the device that declared it.
#[derive(Debug, Clone)]
pub struct ActionHandle {
    name: String,
    device_id: String,
    definition: ActionDefinition,
    device: Arc<Attributes>,
}

impl ActionHandle {
    /// Bind `definition` to `device`.
    #[must_use]
    pub fn new(name: &str, device: &Device, definition: ActionDefinition) -> Self {
        Self {
            name: name.to_string(),
            device_id: device.id().to_string(),
            definition,
            device: Arc::clone(device.attributes()),
        }
    }

    /// Action identifier (the action file's stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the owning device.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Attributes of the owning device.
    #[must_use]
    pub const fn device_attributes(&self) -> &Arc<Attributes> {
        &self.device
    }

    /// The merged action definition.
    #[must_use]
    pub const fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    /// Display name from the definition.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.definition.name
    }

    /// Ranking hint.
    #[must_use]
    pub const fn rank(&self) -> i64 {
        self.definition.rank
    }

    /// Icon name.
    #[must_use]
    pub fn icon_name(&self) -> &str {
        &self.definition.icon_name
    }

    /// Render the action's description against the device's attributes.
    ///
    /// # Errors
    ///
    /// Propagates [`TemplateError`]s, including `MissingKey`.
    pub fn describe(&self) -> std::result::Result<String, TemplateError> {
        substitute(&self.definition.descr, &self.device)
    }

    /// Work out what activation would dispatch, without dispatching it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::MissingField`] if a `command`/`uri` action
    /// has no template, or a [`ConnectablesError::Template`] error.
    pub fn prepare(&self) -> Result<Dispatch> {
        fn template<'t>(
            action: &str,
            field: &'static str,
            value: Option<&'t String>,
        ) -> Result<&'t String> {
            value.ok_or_else(|| ConnectablesError::MissingField {
                action: action.to_string(),
                field,
            })
        }

        let cmd = self.definition.cmd.as_ref();
        let uri = self.definition.uri.as_ref();
        Ok(match &self.definition.kind {
            ActionKind::Command => Dispatch::Command {
                cmdline: substitute(template(&self.name, "cmd", cmd)?, &self.device)?,
                env: self.definition.env.clone(),
            },
            ActionKind::Uri => Dispatch::Uri {
                uri: substitute(template(&self.name, "uri", uri)?, &self.device)?,
            },
            ActionKind::Other(kind) => Dispatch::Ignored { kind: kind.clone() },
        })
    }

    /// Activate the action through `launcher`.
    ///
    /// Fire-and-forget: the launched process is not awaited and its exit
    /// status is not reported. Unknown action types do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`prepare`](Self::prepare) errors and launcher spawn failures.
    pub fn activate(&self, launcher: &dyn Launcher) -> Result<Dispatch> {
        let dispatch = self.prepare()?;
        match &dispatch {
            Dispatch::Command { cmdline, env } => launcher.launch_command(cmdline, env)?,
            Dispatch::Uri { uri } => launcher.open_uri(uri)?,
            Dispatch::Ignored { kind } => {
                tracing::debug!("action '{}' has type '{kind}'; nothing to do", self.name);
            }
        }
        Ok(dispatch)
    }
}

/// Resolve the definition of action `name` through `cache`.
///
/// Never fails: a missing file yields [`ActionDefinition::defaults`], a file
/// that cannot be read or parsed yields [`ActionDefinition::unreadable`], and
/// ill-typed fields fall back one by one. Every fallback is logged.
#[must_use]
pub fn resolve_definition(cache: &ActionCache, name: &str) -> ActionDefinition {
    match cache.get(name) {
        Ok(data) => {
            let (definition, problems) = ActionDefinition::from_mapping(name, &data);
            for problem in &problems {
                tracing::warn!("action '{name}': {problem}; using the default");
            }
            definition
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!("action file for '{name}' is missing");
            ActionDefinition::defaults(name)
        }
        Err(e) => {
            tracing::warn!("action '{name}' could not be loaded: {e}");
            ActionDefinition::unreadable(name, &e.to_string())
        }
    }
}

/// One handle per entry of the device's `actions` list, in declared order.
#[must_use]
pub fn actions_of(device: &Device, cache: &ActionCache) -> Vec<ActionHandle> {
    device
        .action_names()
        .into_iter()
        .map(|name| ActionHandle::new(name, device, resolve_definition(cache, name)))
        .collect()
}

/// Order handles by rank, highest first; ties keep their declared order.
#[must_use]
pub fn rank_sorted(mut handles: Vec<ActionHandle>) -> Vec<ActionHandle> {
    handles.sort_by_key(|h| Reverse(h.rank()));
    handles
}
