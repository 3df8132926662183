use std::env;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;
use crate::gateway::GatewayVia;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Configuration abstracts config options for the book manager
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub env: String,
    pub store: RepositoryStore,
    pub ownership_via: GatewayVia,
    pub ownership_service_url: String,
    pub jwt_secret: String,
    pub dynamodb_endpoint: String,
    pub books_table: String,
    pub titles_table: String,
}

// environments that may run on local defaults, everything else is treated as deployed
const LOCAL_ENVS: [&str; 3] = ["dev", "test", "local"];

impl Configuration {
    // Local environments use the in-memory store and ownership service. Deployed environments
    // default to DynamoDB and the REST ownership service and carry no secret or service url.
    pub fn new(env: &str) -> Self {
        let local = Configuration::is_local_env(env);
        Configuration {
            env: env.to_string(),
            store: if local { RepositoryStore::InMemory } else { RepositoryStore::DynamoDB },
            ownership_via: if local { GatewayVia::InMemory } else { GatewayVia::Rest },
            ownership_service_url: if local { "http://localhost:8081/api/v1".to_string() } else { String::new() },
            jwt_secret: if local { "secret".to_string() } else { String::new() },
            dynamodb_endpoint: "http://localhost:8000".to_string(),
            books_table: "books".to_string(),
            titles_table: "book_titles".to_string(),
        }
    }

    pub fn is_local_env(env: &str) -> bool {
        LOCAL_ENVS.contains(&env.to_lowercase().as_str())
    }

    pub fn is_local(&self) -> bool {
        Configuration::is_local_env(self.env.as_str())
    }

    // overrides the defaults with BOOK_MANAGER_* style environment variables
    pub fn from_env() -> LibraryResult<Self> {
        Configuration::from_vars(|name| env::var(name).ok())
    }

    pub(crate) fn from_vars<F>(var: F) -> LibraryResult<Self> where F: Fn(&str) -> Option<String> {
        let mut config = Configuration::new(
            var("BOOK_MANAGER_ENV").unwrap_or_else(|| "dev".to_string()).as_str());
        if let Some(store) = var("BOOK_MANAGER_STORE") {
            config.store = RepositoryStore::from(store);
        }
        if let Some(via) = var("OWNERSHIP_SERVICE_VIA") {
            config.ownership_via = GatewayVia::from(via);
        }
        if let Some(url) = var("OWNERSHIP_SERVICE_URL") {
            config.ownership_service_url = url;
        }
        if let Some(secret) = var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Some(endpoint) = var("DYNAMODB_ENDPOINT") {
            config.dynamodb_endpoint = endpoint;
        }
        config.validate()?;
        Ok(config)
    }

    // Deployed environments must not run on in-memory collaborators or without a secret.
    pub fn validate(&self) -> LibraryResult<()> {
        if self.is_local() {
            return Ok(());
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(missing(self, "JWT_SECRET"));
        }
        if self.store == RepositoryStore::InMemory {
            return Err(LibraryError::validation(
                format!("BOOK_MANAGER_STORE must be dynamodb or local-dynamodb in {}", self.env).as_str(),
                Some("BOOK_MANAGER_STORE".to_string())));
        }
        if self.ownership_via == GatewayVia::InMemory {
            return Err(LibraryError::validation(
                format!("OWNERSHIP_SERVICE_VIA must be rest in {}", self.env).as_str(),
                Some("OWNERSHIP_SERVICE_VIA".to_string())));
        }
        if self.ownership_service_url.trim().is_empty() {
            return Err(missing(self, "OWNERSHIP_SERVICE_URL"));
        }
        Ok(())
    }
}

fn missing(config: &Configuration, name: &str) -> LibraryError {
    LibraryError::validation(
        format!("{} is required in {}", name, config.env).as_str(), Some(name.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::RepositoryStore;
    use crate::gateway::GatewayVia;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.env);
        assert_eq!(RepositoryStore::InMemory, config.store);
        assert_eq!(GatewayVia::InMemory, config.ownership_via);
        assert_eq!("books", config.books_table);
        assert_eq!("book_titles", config.titles_table);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| pairs.get(name).cloned()
    }

    #[tokio::test]
    async fn test_should_use_local_defaults_in_dev() {
        let config = Configuration::from_vars(vars(&[])).expect("dev should start on defaults");
        assert_eq!("dev", config.env);
        assert_eq!(RepositoryStore::InMemory, config.store);
        assert_eq!(GatewayVia::InMemory, config.ownership_via);
    }

    #[tokio::test]
    async fn test_should_refuse_prod_without_secret() {
        let res = Configuration::from_vars(vars(&[("BOOK_MANAGER_ENV", "prod")]));
        match res {
            Err(LibraryError::Validation { reason_code, .. }) => assert_eq!(Some("JWT_SECRET".to_string()), reason_code),
            other => panic!("unexpected config {:?}", other),
        }
        let res = Configuration::from_vars(vars(&[("BOOK_MANAGER_ENV", "prod"), ("JWT_SECRET", "s3cr3t")]));
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_refuse_in_memory_collaborators_in_prod() {
        let base = [("BOOK_MANAGER_ENV", "prod"), ("JWT_SECRET", "s3cr3t"),
            ("OWNERSHIP_SERVICE_URL", "https://assets.example.com/api/v1")];
        let mut with_store = base.to_vec();
        with_store.push(("BOOK_MANAGER_STORE", "memory"));
        assert!(Configuration::from_vars(vars(&with_store)).is_err());
        let mut with_via = base.to_vec();
        with_via.push(("OWNERSHIP_SERVICE_VIA", "memory"));
        assert!(Configuration::from_vars(vars(&with_via)).is_err());
    }

    #[tokio::test]
    async fn test_should_default_prod_to_dynamodb_and_rest() {
        let config = Configuration::from_vars(vars(&[("BOOK_MANAGER_ENV", "prod"), ("JWT_SECRET", "s3cr3t"),
            ("OWNERSHIP_SERVICE_URL", "https://assets.example.com/api/v1")])).expect("should build prod config");
        assert_eq!(RepositoryStore::DynamoDB, config.store);
        assert_eq!(GatewayVia::Rest, config.ownership_via);
        assert_eq!("s3cr3t", config.jwt_secret);
        assert!(!config.is_local());
    }
}
