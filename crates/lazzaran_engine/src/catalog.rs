#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use lazzaran_contracts::command::{
    ActionId, CommandCategory, CommandDefinition, TriggerPattern,
};
use lazzaran_contracts::ContractViolation;

use crate::normalize::NormalizerRuntime;

pub const CATALOG_DOCUMENT_VERSION: u32 = 1;

/// Catalog load failure. Fatal at startup: the process must not begin
/// matching against a malformed or ambiguous command set.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Document(String),
    UnsupportedSchemaVersion { got: u32 },
    Empty,
    DuplicateActionId(String),
    DuplicateTrigger { phrase: String, first: String, second: String },
    Contract(ContractViolation),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(detail) => write!(f, "catalog document unreadable: {detail}"),
            Self::UnsupportedSchemaVersion { got } => {
                write!(f, "unsupported catalog schema version {got}")
            }
            Self::Empty => write!(f, "catalog declares no commands"),
            Self::DuplicateActionId(id) => write!(f, "duplicate action_id {id}"),
            Self::DuplicateTrigger { phrase, first, second } => write!(
                f,
                "trigger \"{phrase}\" is declared by both {first} and {second}"
            ),
            Self::Contract(violation) => write!(f, "catalog entry invalid: {violation:?}"),
        }
    }
}

impl From<ContractViolation> for CatalogError {
    fn from(violation: ContractViolation) -> Self {
        Self::Contract(violation)
    }
}

/// External catalog document shape. Trigger phrases are free text here;
/// they are normalized into token patterns at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    pub schema_version: u32,
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandEntry {
    pub action_id: String,
    pub category: CommandCategory,
    pub triggers: Vec<String>,
    #[serde(default)]
    pub requires_argument: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub target: Option<String>,
}

/// The immutable command registry. Loaded once at startup and shared by
/// reference; declaration order is preserved and feeds the matcher's final
/// tie-break. Reload means building a new `Catalog` and swapping the value
/// whole.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<CommandDefinition>,
}

impl Catalog {
    pub fn load(document: &CatalogDocument) -> Result<Self, CatalogError> {
        if document.schema_version != CATALOG_DOCUMENT_VERSION {
            return Err(CatalogError::UnsupportedSchemaVersion {
                got: document.schema_version,
            });
        }
        Self::from_entries(&document.commands)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(raw).map_err(|e| CatalogError::Document(e.to_string()))?;
        Self::load(&document)
    }

    /// The original assistant's Turkish command set, alias phrases folded
    /// into the trigger lists.
    pub fn builtin_turkish() -> Self {
        Self::from_entries(&builtin_entries())
            .unwrap_or_else(|_| unreachable!("built-in catalog is statically well formed"))
    }

    fn from_entries(entries: &[CommandEntry]) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let trigger_normalizer = NormalizerRuntime::bare();
        let mut definitions = Vec::with_capacity(entries.len());
        let mut seen_actions: BTreeMap<String, ()> = BTreeMap::new();
        let mut seen_triggers: BTreeMap<Vec<String>, String> = BTreeMap::new();

        for entry in entries {
            let action_id = ActionId::new(entry.action_id.clone())?;
            if seen_actions
                .insert(action_id.as_str().to_string(), ())
                .is_some()
            {
                return Err(CatalogError::DuplicateActionId(
                    action_id.as_str().to_string(),
                ));
            }

            let mut triggers = Vec::with_capacity(entry.triggers.len());
            for phrase in &entry.triggers {
                let tokens = trigger_normalizer.normalize(phrase);
                let pattern = TriggerPattern::new(tokens.tokens().to_vec())?;
                if let Some(owner) = seen_triggers.get(pattern.tokens()) {
                    if owner != action_id.as_str() {
                        return Err(CatalogError::DuplicateTrigger {
                            phrase: pattern.phrase(),
                            first: owner.clone(),
                            second: action_id.as_str().to_string(),
                        });
                    }
                }
                seen_triggers.insert(pattern.tokens().to_vec(), action_id.as_str().to_string());
                triggers.push(pattern);
            }

            definitions.push(CommandDefinition::v1(
                action_id,
                entry.category,
                triggers,
                entry.requires_argument,
                entry.priority,
                entry.target.clone(),
            )?);
        }

        Ok(Self { definitions })
    }

    pub fn all_definitions(&self) -> &[CommandDefinition] {
        &self.definitions
    }

    pub fn get(&self, action_id: &ActionId) -> Option<&CommandDefinition> {
        self.definitions.iter().find(|d| &d.action_id == action_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn entry(
    action_id: &str,
    category: CommandCategory,
    triggers: &[&str],
    requires_argument: bool,
    priority: i32,
    target: Option<&str>,
) -> CommandEntry {
    CommandEntry {
        action_id: action_id.to_string(),
        category,
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
        requires_argument,
        priority,
        target: target.map(|t| t.to_string()),
    }
}

fn builtin_entries() -> Vec<CommandEntry> {
    use CommandCategory::{Application, System, WebService};

    vec![
        entry(
            "search_google",
            WebService,
            &["google'da ara", "googleda ara", "internette ara"],
            true,
            // Argument-bearing search must beat commands whose triggers can
            // also occur inside the search text ("google'da ara istanbul
            // hava durumu" must not resolve to the weather command).
            1,
            None,
        ),
        entry(
            "search_news",
            WebService,
            &["haber ara", "haberlerde ara"],
            true,
            1,
            None,
        ),
        entry(
            "open_google",
            WebService,
            &["google'ı aç", "google'a git"],
            false,
            0,
            None,
        ),
        entry(
            "open_youtube",
            WebService,
            &["youtube'u aç", "youtube aç"],
            false,
            0,
            None,
        ),
        entry(
            "weather_report",
            WebService,
            &["hava durumu", "havayı söyle", "hava nasıl"],
            false,
            0,
            None,
        ),
        entry(
            "top_headlines",
            WebService,
            &["haberler", "haber ver", "haberleri göster"],
            false,
            0,
            None,
        ),
        entry("ai_chat", WebService, &["sohbet", "sohbet et"], true, 0, None),
        entry(
            "current_time",
            System,
            &["saat kaç", "saati söyle", "saat"],
            false,
            0,
            None,
        ),
        entry(
            "shutdown_computer",
            System,
            &["bilgisayarı kapat", "sistemi kapat", "kapat"],
            false,
            0,
            None,
        ),
        entry(
            "restart_computer",
            System,
            &["yeniden başlat", "bilgisayarı yeniden başlat"],
            false,
            0,
            None,
        ),
        entry(
            "open_calculator",
            Application,
            &["hesap makinesi", "hesap makinesini aç"],
            false,
            0,
            Some("calculator"),
        ),
        entry(
            "open_notepad",
            Application,
            &["not defteri", "not defterini aç"],
            false,
            0,
            Some("notepad"),
        ),
        entry(
            "open_browser",
            Application,
            &["chrome'u aç", "tarayıcıyı aç", "tarayıcıyı başlat"],
            false,
            0,
            Some("chrome"),
        ),
        entry("open_application", Application, &["aç"], true, 0, None),
    ]
}
