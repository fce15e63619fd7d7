//! ICP Models
//!
//! Ideal Customer Profile records, their scoring parameters, and the
//! create/update request shapes.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::prompt::generate_icp_system_prompt;
use crate::utils::error::{AppError, AppResult};

/// Default bounds applied when a parameter becomes a Score Range
pub const DEFAULT_SCORING_MIN: i64 = 1;
pub const DEFAULT_SCORING_MAX: i64 = 100;

/// Cosmetic palette tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IcpColor {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    #[serde(rename = "default")]
    Neutral,
}

/// How the assistant reports its assessment of one parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScoringType {
    #[default]
    #[serde(rename = "Score Range")]
    ScoreRange,
    Binary,
    Number,
    #[serde(rename = "String")]
    Text,
}

impl ScoringType {
    /// Wire label, e.g. `"Score Range"`
    pub fn label(&self) -> &'static str {
        match self {
            ScoringType::ScoreRange => "Score Range",
            ScoringType::Binary => "Binary",
            ScoringType::Number => "Number",
            ScoringType::Text => "String",
        }
    }

    /// Parse a wire label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Score Range" => Some(ScoringType::ScoreRange),
            "Binary" => Some(ScoringType::Binary),
            "Number" => Some(ScoringType::Number),
            "String" => Some(ScoringType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One scoring dimension of an ICP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomParameter {
    pub id: String,
    pub parameter_name: String,
    #[serde(default)]
    pub parameter_description: String,
    #[serde(default)]
    pub scoring_type: ScoringType,
    /// Only meaningful for `ScoringType::ScoreRange`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_max: Option<i64>,
}

impl CustomParameter {
    /// A new Score Range parameter with the default 1..100 bounds
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parameter_name: name.into(),
            parameter_description: description.into(),
            scoring_type: ScoringType::ScoreRange,
            scoring_min: Some(DEFAULT_SCORING_MIN),
            scoring_max: Some(DEFAULT_SCORING_MAX),
        }
    }

    /// Change the scoring type.
    ///
    /// Leaving Score Range drops both bounds; entering it fills whichever
    /// bound is absent with its default.
    pub fn set_scoring_type(&mut self, scoring_type: ScoringType) {
        self.scoring_type = scoring_type;
        if scoring_type == ScoringType::ScoreRange {
            self.scoring_min.get_or_insert(DEFAULT_SCORING_MIN);
            self.scoring_max.get_or_insert(DEFAULT_SCORING_MAX);
        } else {
            self.scoring_min = None;
            self.scoring_max = None;
        }
    }

    /// Set the lower bound, raising the upper bound if it would fall below
    pub fn set_scoring_min(&mut self, min: i64) {
        if self.scoring_type != ScoringType::ScoreRange {
            return;
        }
        self.scoring_min = Some(min);
        if matches!(self.scoring_max, Some(max) if min > max) {
            self.scoring_max = Some(min);
        }
    }

    /// Set the upper bound, lowering the lower bound if it would rise above
    pub fn set_scoring_max(&mut self, max: i64) {
        if self.scoring_type != ScoringType::ScoreRange {
            return;
        }
        self.scoring_max = Some(max);
        if matches!(self.scoring_min, Some(min) if max < min) {
            self.scoring_min = Some(max);
        }
    }

    /// Drop bounds that do not belong to the current scoring type
    pub fn normalized(mut self) -> Self {
        if self.scoring_type != ScoringType::ScoreRange {
            self.scoring_min = None;
            self.scoring_max = None;
        }
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.parameter_name.trim().is_empty() {
            return Err(AppError::validation("Parameter name cannot be empty"));
        }
        if self.scoring_type == ScoringType::ScoreRange {
            match (self.scoring_min, self.scoring_max) {
                (Some(min), Some(max)) if min <= max => {}
                (Some(min), Some(max)) => {
                    return Err(AppError::validation(format!(
                        "Parameter '{}': minimum ({}) must not exceed maximum ({})",
                        self.parameter_name, min, max
                    )))
                }
                _ => {
                    return Err(AppError::validation(format!(
                        "Parameter '{}': Score Range requires both a minimum and a maximum",
                        self.parameter_name
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Validate a parameter list: every entry valid, ids unique
pub fn validate_parameters(parameters: &[CustomParameter]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for param in parameters {
        param.validate()?;
        if !seen.insert(param.id.as_str()) {
            return Err(AppError::validation(format!(
                "Duplicate parameter id: {}",
                param.id
            )));
        }
    }
    Ok(())
}

/// Synchronization state of the remote assistant mirroring an ICP
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssistantLink {
    /// Never synchronized, or the last sync attempt failed
    #[default]
    Unsynced,
    /// Mirrored by the remote assistant with this resource id
    Synced(String),
}

impl AssistantLink {
    pub fn assistant_id(&self) -> Option<&str> {
        match self {
            AssistantLink::Unsynced => None,
            AssistantLink::Synced(id) => Some(id),
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, AssistantLink::Synced(_))
    }
}

impl From<Option<String>> for AssistantLink {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) if !id.is_empty() => AssistantLink::Synced(id),
            _ => AssistantLink::Unsynced,
        }
    }
}

impl From<AssistantLink> for Option<String> {
    fn from(link: AssistantLink) -> Self {
        match link {
            AssistantLink::Unsynced => None,
            AssistantLink::Synced(id) => Some(id),
        }
    }
}

impl Serialize for AssistantLink {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.assistant_id().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AssistantLink {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(AssistantLink::from)
    }
}

/// An Ideal Customer Profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Icp {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub custom_parameters: Vec<CustomParameter>,
    #[serde(default)]
    pub color: IcpColor,
    #[serde(
        rename = "assistantId",
        default,
        skip_serializing_if = "AssistantLink::is_unsynced"
    )]
    pub assistant: AssistantLink,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(rename = "userId", default)]
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub date_modified: String,
}

impl AssistantLink {
    fn is_unsynced(&self) -> bool {
        !self.is_synced()
    }
}

impl Icp {
    /// Render the assistant instructions from the current definition
    pub fn render_system_prompt(&self) -> String {
        generate_icp_system_prompt(&self.name, &self.description, &self.custom_parameters)
    }
}

/// `"ICP Assistant - {name}"`
pub fn assistant_display_name(icp_name: &str) -> String {
    format!("ICP Assistant - {}", icp_name)
}

/// Fields supplied when creating an ICP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IcpDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub custom_parameters: Vec<CustomParameter>,
    #[serde(default)]
    pub color: Option<IcpColor>,
}

impl IcpDraft {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("ICP name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::validation("ICP description cannot be empty"));
        }
        validate_parameters(&self.custom_parameters)
    }
}

/// Partial update of an ICP; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IcpUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_parameters: Option<Vec<CustomParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<IcpColor>,
}

impl IcpUpdate {
    /// Whether the update touches any field the system prompt is rendered from
    pub fn affects_prompt(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.custom_parameters.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.affects_prompt() && self.color.is_none()
    }

    /// Validate the fields that are present
    pub fn validate(&self) -> AppResult<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(AppError::validation("ICP name cannot be empty"));
        }
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            return Err(AppError::validation("ICP description cannot be empty"));
        }
        if let Some(params) = &self.custom_parameters {
            validate_parameters(params)?;
        }
        Ok(())
    }

    /// Merge into an existing record (prompt and timestamps are the caller's job)
    pub fn apply_to(self, icp: &mut Icp) {
        if let Some(name) = self.name {
            icp.name = name;
        }
        if let Some(description) = self.description {
            icp.description = description;
        }
        if let Some(params) = self.custom_parameters {
            icp.custom_parameters = params.into_iter().map(CustomParameter::normalized).collect();
        }
        if let Some(color) = self.color {
            icp.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn team_size() -> CustomParameter {
        let mut p = CustomParameter::new("Team Size", "Number of marketing team members");
        p.set_scoring_max(50);
        p
    }

    #[test]
    fn test_new_parameter_defaults_to_score_range() {
        let p = CustomParameter::new("Company Size", "Employees");
        assert_eq!(p.scoring_type, ScoringType::ScoreRange);
        assert_eq!(p.scoring_min, Some(1));
        assert_eq!(p.scoring_max, Some(100));
    }

    #[test]
    fn test_switching_to_string_clears_bounds() {
        let mut p = team_size();
        assert_eq!((p.scoring_min, p.scoring_max), (Some(1), Some(50)));

        p.set_scoring_type(ScoringType::Text);
        assert_eq!(p.scoring_min, None);
        assert_eq!(p.scoring_max, None);
    }

    #[test]
    fn test_switching_back_to_score_range_restores_defaults() {
        let mut p = team_size();
        p.set_scoring_type(ScoringType::Binary);
        p.set_scoring_type(ScoringType::ScoreRange);
        assert_eq!((p.scoring_min, p.scoring_max), (Some(1), Some(100)));
    }

    #[test]
    fn test_min_above_max_raises_max() {
        let mut p = team_size();
        p.set_scoring_min(70);
        assert_eq!((p.scoring_min, p.scoring_max), (Some(70), Some(70)));
    }

    #[test]
    fn test_max_below_min_lowers_min() {
        let mut p = team_size();
        p.set_scoring_min(10);
        p.set_scoring_max(5);
        assert_eq!((p.scoring_min, p.scoring_max), (Some(5), Some(5)));
    }

    #[test]
    fn test_parameter_wire_format() {
        let mut p = team_size();
        p.id = "param_4".to_string();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "param_4",
                "parameterName": "Team Size",
                "parameterDescription": "Number of marketing team members",
                "scoringType": "Score Range",
                "scoringMin": 1,
                "scoringMax": 50,
            })
        );

        p.set_scoring_type(ScoringType::Text);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["scoringType"], "String");
        assert!(json.get("scoringMin").is_none());
    }

    #[test]
    fn test_validate_parameters_rejects_duplicates_and_bad_range() {
        let a = team_size();
        let mut b = a.clone();
        b.parameter_name = "Other".to_string();
        assert!(validate_parameters(&[a.clone(), b]).is_err());

        let mut bad = a.clone();
        bad.scoring_min = Some(10);
        bad.scoring_max = Some(2);
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));

        let mut unnamed = a;
        unnamed.parameter_name = "   ".to_string();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_assistant_link_serializes_as_optional_id() {
        let icp = Icp {
            id: "icp_1".to_string(),
            name: "SaaS".to_string(),
            description: "Mid-market SaaS".to_string(),
            custom_parameters: vec![],
            color: IcpColor::Neutral,
            assistant: AssistantLink::Synced("asst_1".to_string()),
            system_prompt: String::new(),
            owner_id: "demo-user-123".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            date_modified: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&icp).unwrap();
        assert_eq!(json["assistantId"], "asst_1");
        assert_eq!(json["color"], "default");
        assert_eq!(json["userId"], "demo-user-123");

        let mut unsynced = icp;
        unsynced.assistant = AssistantLink::Unsynced;
        let json = serde_json::to_value(&unsynced).unwrap();
        assert!(json.get("assistantId").is_none());

        let back: Icp = serde_json::from_value(json).unwrap();
        assert_eq!(back.assistant, AssistantLink::Unsynced);
    }

    #[test]
    fn test_empty_assistant_id_reads_as_unsynced() {
        assert_eq!(AssistantLink::from(Some(String::new())), AssistantLink::Unsynced);
        assert_eq!(
            AssistantLink::from(Some("asst_9".to_string())),
            AssistantLink::Synced("asst_9".to_string())
        );
    }

    #[test]
    fn test_draft_validation() {
        let draft = IcpDraft {
            name: " ".to_string(),
            description: "d".to_string(),
            custom_parameters: vec![],
            color: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_update_affects_prompt() {
        assert!(!IcpUpdate {
            color: Some(IcpColor::Pink),
            ..Default::default()
        }
        .affects_prompt());
        assert!(IcpUpdate {
            description: Some("new".to_string()),
            ..Default::default()
        }
        .affects_prompt());
        assert!(IcpUpdate::default().is_empty());
    }

    #[test]
    fn test_scoring_type_labels() {
        for t in [
            ScoringType::ScoreRange,
            ScoringType::Binary,
            ScoringType::Number,
            ScoringType::Text,
        ] {
            assert_eq!(ScoringType::from_label(t.label()), Some(t));
        }
        assert_eq!(ScoringType::from_label("Percent"), None);
    }
}
