use crate::shared::serde_ext::parse_via_string;
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Data shapes consumed from the surrounding application (shape, not
/// transport). None of these feed back into the engine's own rules.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let pages = page_count(total, per_page);
        Self {
            items,
            total,
            page,
            per_page,
            pages,
        }
    }
}

pub fn page_count(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64) as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction `{other}`")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "sort direction", Self::parse)
    }
}

/// Filter and paging parameters for the case listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    25
}

impl Default for CaseListQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            assignee: None,
            sort_field: None,
            direction: SortDirection::Asc,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// One access-role assignment on a case. At least one maintenance contact is
/// a precondition the readiness check encodes externally; the engine only
/// carries the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRoleEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_type: String,
    #[serde(default)]
    pub has_ongoing_maintenance_access: bool,
    #[serde(default)]
    pub is_account_executive: bool,
}

/// Informational event feed entry; never consulted by the workflow rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub icon: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

pub fn filter_by_tag<'a>(events: &'a [TimelineEvent], tag: &str) -> Vec<&'a TimelineEvent> {
    events
        .iter()
        .filter(|event| event.tag.as_deref() == Some(tag))
        .collect()
}

/// Named-role allow-list for a gated area. The acting role arrives as an
/// explicit input; ambient session state stays outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    allowed_roles: Vec<String>,
}

impl RouteGate {
    pub fn new<I, S>(allowed_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: allowed_roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, role: &str) -> bool {
        self.allowed_roles.iter().any(|allowed| allowed == role)
    }
}
