use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use crate::books::criteria::BookCriteria;
use crate::books::dto::{BookCreate, BookDto, BookUpdate};
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::security::{bearer_token, Authenticator, DigitalUser};
use crate::gateway::assets::{AssetCriteria, AssetRequest, AssetResponse, OwnershipService};
use crate::gateway::memory::service::MemoryOwnershipService;

// Uses the bearer token itself as the subject, so "Bearer alice" authenticates alice.
pub(crate) struct TokenSubjectAuthenticator;

impl Authenticator for TokenSubjectAuthenticator {
    fn digital_user(&self, jwt: Option<&str>) -> LibraryResult<DigitalUser> {
        bearer_token(jwt).map(DigitalUser::new)
    }
}

fn record(calls: &Mutex<Vec<&'static str>>, name: &'static str) {
    if let Ok(mut calls) = calls.lock() {
        calls.push(name);
    }
}

fn recorded(calls: &Mutex<Vec<&'static str>>) -> Vec<&'static str> {
    calls.lock().map(|c| c.clone()).unwrap_or_default()
}

pub(crate) struct FakeCatalog {
    inner: CatalogServiceImpl,
    pub(crate) fail_remove: AtomicBool,
    pub(crate) fail_find: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeCatalog {
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        recorded(&self.calls)
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn add_book(&self, book: &BookCreate) -> LibraryResult<BookDto> {
        record(&self.calls, "add_book");
        self.inner.add_book(book).await
    }

    async fn remove_book(&self, id: &str) -> LibraryResult<()> {
        record(&self.calls, "remove_book");
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(LibraryError::unavailable("catalog store down", None, true));
        }
        self.inner.remove_book(id).await
    }

    async fn update_book(&self, id: &str, update: &BookUpdate) -> LibraryResult<BookDto> {
        record(&self.calls, "update_book");
        self.inner.update_book(id, update).await
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        record(&self.calls, "find_book_by_id");
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(LibraryError::database("catalog read failed", None, false));
        }
        self.inner.find_book_by_id(id).await
    }

    async fn find_book_by_title(&self, title: &str) -> LibraryResult<BookDto> {
        record(&self.calls, "find_book_by_title");
        self.inner.find_book_by_title(title).await
    }

    async fn list_books(&self, criteria: &BookCriteria) -> LibraryResult<Vec<BookDto>> {
        record(&self.calls, "list_books");
        self.inner.list_books(criteria).await
    }
}

pub(crate) struct FakeOwnership {
    pub(crate) inner: MemoryOwnershipService,
    pub(crate) fail_create: AtomicBool,
    pub(crate) fail_list: AtomicBool,
    pub(crate) fail_delete: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
    last_criteria: Mutex<Option<AssetCriteria>>,
}

impl FakeOwnership {
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        recorded(&self.calls)
    }

    pub(crate) fn last_criteria(&self) -> Option<AssetCriteria> {
        self.last_criteria.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl OwnershipService for FakeOwnership {
    async fn create_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     req: &AssetRequest) -> LibraryResult<AssetResponse> {
        record(&self.calls, "create");
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(LibraryError::unavailable("asset service down", Some("503".to_string()), true));
        }
        self.inner.create_ownership_record(jwt, digital_user_id, req).await
    }

    async fn list_ownership_records(&self, jwt: &str, digital_user_id: &str,
                                    criteria: &AssetCriteria) -> LibraryResult<Vec<AssetResponse>> {
        record(&self.calls, "list");
        if let Ok(mut last) = self.last_criteria.lock() {
            *last = Some(criteria.clone());
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(LibraryError::unavailable("asset service down", Some("503".to_string()), true));
        }
        self.inner.list_ownership_records(jwt, digital_user_id, criteria).await
    }

    async fn delete_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     external_id: &str) -> LibraryResult<()> {
        record(&self.calls, "delete");
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(LibraryError::unavailable("asset service down", Some("503".to_string()), true));
        }
        self.inner.delete_ownership_record(jwt, digital_user_id, external_id).await
    }
}

pub(crate) struct Fixture {
    pub(crate) catalog: Arc<FakeCatalog>,
    pub(crate) ownership: Arc<FakeOwnership>,
    pub(crate) authenticator: Arc<dyn Authenticator>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let config = Configuration::new("test");
        Self {
            catalog: Arc::new(FakeCatalog {
                inner: CatalogServiceImpl::new(&config, Arc::new(MemoryBookRepository::new())),
                fail_remove: AtomicBool::new(false),
                fail_find: AtomicBool::new(false),
                calls: Mutex::new(vec![]),
            }),
            ownership: Arc::new(FakeOwnership {
                inner: MemoryOwnershipService::new(),
                fail_create: AtomicBool::new(false),
                fail_list: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
                calls: Mutex::new(vec![]),
                last_criteria: Mutex::new(None),
            }),
            authenticator: Arc::new(TokenSubjectAuthenticator),
        }
    }

    pub(crate) fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    pub(crate) fn ownership(&self) -> Arc<dyn OwnershipService> {
        self.ownership.clone()
    }

    pub(crate) fn jwt(user: &str) -> Option<String> {
        Some(format!("Bearer {}", user))
    }

    // a book in the catalog plus its ownership record for the given user
    pub(crate) async fn owned_book(&self, user: &str, title: &str) -> BookDto {
        let book = self.catalog.inner.add_book(&BookCreate::new(title, "author")).await
            .expect("should add book");
        self.ownership.inner.create_ownership_record("jwt", user, &AssetRequest::book(book.book_id.as_str())).await
            .expect("should register book");
        book
    }
}
