use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::books::criteria::BookCriteria;
use crate::core::library::LibraryResult;

// Classification of every ownership record written by this service
pub const GROUP_ID: &str = "com.tracktainment";
pub const ARTIFACT_ID: &str = "book-manager";
pub const ARTIFACT_VERSION: &str = "0.0.1-SNAPSHOT";
pub const ASSET_TYPE: &str = "book";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInformation {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ArtifactInformation {
    pub fn book_manager() -> Self {
        Self {
            group_id: GROUP_ID.to_string(),
            artifact_id: ARTIFACT_ID.to_string(),
            version: ARTIFACT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionPolicy {
    Owner,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub external_id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub permission_policy: PermissionPolicy,
    pub artifact_information: ArtifactInformation,
}

impl AssetRequest {
    // ownership record for a book owned by the caller
    pub fn book(external_id: &str) -> Self {
        Self {
            external_id: external_id.to_string(),
            asset_type: ASSET_TYPE.to_string(),
            permission_policy: PermissionPolicy::Owner,
            artifact_information: ArtifactInformation::book_manager(),
        }
    }
}

// Only external_id is read back. The asset service may omit or extend the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    #[serde(default)]
    pub id: String,
    pub external_id: String,
    #[serde(default, rename = "type")]
    pub asset_type: String,
    #[serde(default)]
    pub permission_policy: Option<PermissionPolicy>,
    #[serde(default)]
    pub artifact_information: ArtifactInformation,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

// AssetCriteria selects ownership records of one digital user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCriteria {
    pub external_ids: Option<Vec<String>>,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub created_at: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AssetCriteria {
    pub fn books(external_ids: Option<Vec<String>>) -> Self {
        Self {
            external_ids,
            group_id: GROUP_ID.to_string(),
            artifact_id: ARTIFACT_ID.to_string(),
            asset_type: ASSET_TYPE.to_string(),
            created_at: None,
            from: None,
            to: None,
        }
    }

    pub fn book(external_id: &str) -> Self {
        Self::books(Some(vec![external_id.to_string()]))
    }
}

impl From<&BookCriteria> for AssetCriteria {
    fn from(other: &BookCriteria) -> Self {
        Self {
            created_at: other.created_at,
            from: other.from,
            to: other.to,
            ..AssetCriteria::books(other.ids.clone())
        }
    }
}

#[async_trait]
pub trait OwnershipService: Sync + Send {
    async fn create_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     req: &AssetRequest) -> LibraryResult<AssetResponse>;

    async fn list_ownership_records(&self, jwt: &str, digital_user_id: &str,
                                    criteria: &AssetCriteria) -> LibraryResult<Vec<AssetResponse>>;

    async fn delete_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     external_id: &str) -> LibraryResult<()>;
}
