use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pipeline stage a deal occupies. Declaration order is board order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lead,
    QualifiedSolution,
    QualifiedDelivery,
    QualifiedCso,
    Deal,
    Project,
}

impl Stage {
    pub const COUNT: usize = 6;

    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Lead,
        Stage::QualifiedSolution,
        Stage::QualifiedDelivery,
        Stage::QualifiedCso,
        Stage::Deal,
        Stage::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::QualifiedSolution => "qualified_solution",
            Self::QualifiedDelivery => "qualified_delivery",
            Self::QualifiedCso => "qualified_cso",
            Self::Deal => "deal",
            Self::Project => "project",
        }
    }

    /// Column heading, as the backend titles its board columns.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::QualifiedSolution => "Qualified Solution",
            Self::QualifiedDelivery => "Qualified Delivery",
            Self::QualifiedCso => "Qualified Cso",
            Self::Deal => "Deal",
            Self::Project => "Project",
        }
    }

    /// Position of this stage's column on the board.
    pub fn index(&self) -> usize {
        match self {
            Self::Lead => 0,
            Self::QualifiedSolution => 1,
            Self::QualifiedDelivery => 2,
            Self::QualifiedCso => 3,
            Self::Deal => 4,
            Self::Project => 5,
        }
    }

    /// The analysis the backend conventionally runs for a deal in this stage.
    pub fn insight_kind(&self) -> Option<InsightKind> {
        match self {
            Self::Lead => Some(InsightKind::LeadQualification),
            Self::QualifiedSolution => Some(InsightKind::SolutionDesign),
            Self::QualifiedDelivery => Some(InsightKind::DeliveryPlanning),
            Self::QualifiedCso => Some(InsightKind::ProposalGeneration),
            Self::Deal | Self::Project => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    /// Accepts the wire value in any case (`qualified_cso`, `Qualified_CSO`)
    /// as well as the upper-case enum name the backend also tolerates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Stage::ALL.iter().map(|s| s.as_str()).collect();
                format!("Invalid status: {}. Valid statuses: {}", s, valid.join(", "))
            })
    }
}

/// Stage-specific analysis the backend runs when an insight is triggered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    LeadQualification,
    SolutionDesign,
    DeliveryPlanning,
    ProposalGeneration,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadQualification => "lead_qualification",
            Self::SolutionDesign => "solution_design",
            Self::DeliveryPlanning => "delivery_planning",
            Self::ProposalGeneration => "proposal_generation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LeadQualification => "Lead qualification",
            Self::SolutionDesign => "Solution design",
            Self::DeliveryPlanning => "Delivery planning",
            Self::ProposalGeneration => "Commercial proposal",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A sales opportunity on the board.
///
/// Only `stage` and `board_position` carry board semantics; the remaining
/// fields are rendered as the backend provides them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(rename = "status")]
    pub stage: Stage,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub board_position: i32,
    #[serde(default)]
    pub assigned_person_id: Option<i64>,
    #[serde(default)]
    pub assigned_person: Option<Person>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub budget_range_min: Option<f64>,
    #[serde(default)]
    pub budget_range_max: Option<f64>,
    #[serde(default)]
    pub expected_close_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Deal {
    pub fn new(id: i64, title: &str, stage: Stage) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: None,
            customer_name: None,
            stage,
            priority: Priority::default(),
            board_position: 0,
            assigned_person_id: None,
            assigned_person: None,
            estimated_value: None,
            budget_range_min: None,
            budget_range_max: None,
            expected_close_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_position(mut self, board_position: i32) -> Self {
        self.board_position = board_position;
        self
    }

    pub fn with_value(mut self, estimated_value: f64) -> Self {
        self.estimated_value = Some(estimated_value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub deal_id: i64,
    pub commenter_name: String,
    #[serde(default)]
    pub commenter_role: Option<String>,
    pub comment_text: String,
    #[serde(default)]
    pub created_at: String,
}

/// Comment creation request. The id is assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewComment {
    pub deal_id: i64,
    pub commenter_name: String,
    pub commenter_role: Option<String>,
    pub comment_text: String,
}

/// Stage/position change sent after a move. `deal_id` travels in the URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdate {
    #[serde(skip)]
    pub deal_id: i64,
    pub new_status: Stage,
    pub board_position: i32,
    pub change_reason: String,
}

/// Opaque AI analysis result, rendered by stage-specific view code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InsightPayload(pub serde_json::Value);

impl InsightPayload {
    /// The backend answers stages without an agent with a bare `message`.
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(|m| m.as_str())
    }
}

// Board wire types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumnResponse {
    pub status: Stage,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumnResponse>,
    #[serde(default)]
    pub total_deals: usize,
    #[serde(default)]
    pub total_value: f64,
}

impl BoardResponse {
    /// Flatten the columns back into deals, column order preserved.
    pub fn into_deals(self) -> Vec<Deal> {
        self.columns
            .into_iter()
            .flat_map(|column| column.deals)
            .collect()
    }
}

/// Subset of the deal detail response this engine consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealDetail {
    #[serde(default)]
    pub comments: Vec<Comment>,
}
