use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::assets::{AssetCriteria, AssetRequest, AssetResponse, OwnershipService};
use crate::utils::date::now;

#[derive(Debug, Clone)]
struct OwnershipRecord {
    digital_user_id: String,
    asset: AssetResponse,
}

impl OwnershipRecord {
    fn matches(&self, digital_user_id: &str, criteria: &AssetCriteria) -> bool {
        let asset = &self.asset;
        let created = asset.created_at.map(|c| c.date());
        self.digital_user_id == digital_user_id
            && asset.artifact_information.group_id == criteria.group_id
            && asset.artifact_information.artifact_id == criteria.artifact_id
            && asset.asset_type == criteria.asset_type
            && criteria.external_ids.as_ref().map(|ids| ids.contains(&asset.external_id)).unwrap_or(true)
            && criteria.created_at.map(|d| created == Some(d)).unwrap_or(true)
            && criteria.from.map(|d| created.map(|c| c >= d).unwrap_or(false)).unwrap_or(true)
            && criteria.to.map(|d| created.map(|c| c <= d).unwrap_or(false)).unwrap_or(true)
    }
}

// Ownership records kept in process, for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryOwnershipService {
    records: Mutex<Vec<OwnershipRecord>>,
}

impl MemoryOwnershipService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn owned_external_ids(&self, digital_user_id: &str) -> Vec<String> {
        self.records.lock().await.iter()
            .filter(|r| r.digital_user_id == digital_user_id)
            .map(|r| r.asset.external_id.to_string())
            .collect()
    }
}

#[async_trait]
impl OwnershipService for MemoryOwnershipService {
    async fn create_ownership_record(&self, _jwt: &str, digital_user_id: &str,
                                     req: &AssetRequest) -> LibraryResult<AssetResponse> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.digital_user_id == digital_user_id && r.asset.external_id == req.external_id) {
            return Err(LibraryError::duplicate_key(
                format!("asset {} already exists for {}", req.external_id, digital_user_id).as_str()));
        }
        let now = now();
        let asset = AssetResponse {
            id: Uuid::new_v4().to_string(),
            external_id: req.external_id.to_string(),
            asset_type: req.asset_type.to_string(),
            permission_policy: Some(req.permission_policy),
            artifact_information: req.artifact_information.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        records.push(OwnershipRecord { digital_user_id: digital_user_id.to_string(), asset: asset.clone() });
        Ok(asset)
    }

    async fn list_ownership_records(&self, _jwt: &str, digital_user_id: &str,
                                    criteria: &AssetCriteria) -> LibraryResult<Vec<AssetResponse>> {
        Ok(self.records.lock().await.iter()
            .filter(|r| r.matches(digital_user_id, criteria))
            .map(|r| r.asset.clone())
            .collect())
    }

    async fn delete_ownership_record(&self, _jwt: &str, digital_user_id: &str,
                                     external_id: &str) -> LibraryResult<()> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| !(r.digital_user_id == digital_user_id && r.asset.external_id == external_id));
        if records.len() == before {
            return Err(LibraryError::not_found(format!("asset {} not found", external_id).as_str()));
        }
        Ok(())
    }
}
