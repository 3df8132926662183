use tracing::error;
use crate::core::library::{LibraryError, LibraryResult};

/// Progress of a book creation that spans the catalog store and the ownership service.
///
/// ```text
/// Idle -> Created -> Registered -> Done
///            \-> CompensatingDelete -> Failed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CreateState {
    Idle,
    Created { book_id: String },
    Registered { book_id: String },
    CompensatingDelete { book_id: String },
    Done { book_id: String },
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateEvent {
    RecordCreated(String),
    RecordRejected,
    OwnershipRegistered,
    Completed,
    RegistrationFailed,
    CompensationFinished,
}

impl CreateState {
    pub fn on(self, event: CreateEvent) -> LibraryResult<CreateState> {
        match (self, event) {
            (CreateState::Idle, CreateEvent::RecordCreated(book_id)) => Ok(CreateState::Created { book_id }),
            (CreateState::Idle, CreateEvent::RecordRejected) => Ok(CreateState::Failed),
            (CreateState::Created { book_id }, CreateEvent::OwnershipRegistered) => Ok(CreateState::Registered { book_id }),
            (CreateState::Created { book_id }, CreateEvent::RegistrationFailed) => Ok(CreateState::CompensatingDelete { book_id }),
            (CreateState::Registered { book_id }, CreateEvent::Completed) => Ok(CreateState::Done { book_id }),
            (CreateState::CompensatingDelete { .. }, CreateEvent::CompensationFinished) => Ok(CreateState::Failed),
            (state, event) => Err(illegal_transition(format!("{:?}", state), format!("{:?}", event))),
        }
    }

    // Records an event that has already happened. An illegal transition is logged and leaves
    // the state unchanged.
    pub fn advance(self, event: CreateEvent) -> CreateState {
        match self.clone().on(event) {
            Ok(next) => next,
            Err(err) => {
                error!("book creation: {}", err);
                self
            }
        }
    }

    pub fn book_id(&self) -> Option<&str> {
        match self {
            CreateState::Created { book_id } |
            CreateState::Registered { book_id } |
            CreateState::CompensatingDelete { book_id } |
            CreateState::Done { book_id } => Some(book_id.as_str()),
            CreateState::Idle | CreateState::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CreateState::Done { .. } | CreateState::Failed)
    }
}

/// Progress of a book deletion. Ownership is released first, so a failed local delete
/// leaves the record orphaned and nothing re-registers it.
///
/// ```text
/// Idle -> OwnershipReleased -> Done
///   \-> Failed          \-> Orphaned
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeleteState {
    Idle,
    OwnershipReleased,
    Done,
    Orphaned,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeleteEvent {
    OwnershipReleased,
    OwnershipReleaseFailed,
    RecordDeleted,
    RecordDeleteFailed,
}

impl DeleteState {
    pub fn on(self, event: DeleteEvent) -> LibraryResult<DeleteState> {
        match (self, event) {
            (DeleteState::Idle, DeleteEvent::OwnershipReleased) => Ok(DeleteState::OwnershipReleased),
            (DeleteState::Idle, DeleteEvent::OwnershipReleaseFailed) => Ok(DeleteState::Failed),
            (DeleteState::OwnershipReleased, DeleteEvent::RecordDeleted) => Ok(DeleteState::Done),
            (DeleteState::OwnershipReleased, DeleteEvent::RecordDeleteFailed) => Ok(DeleteState::Orphaned),
            (state, event) => Err(illegal_transition(format!("{:?}", state), format!("{:?}", event))),
        }
    }

    pub fn advance(self, event: DeleteEvent) -> DeleteState {
        match self.on(event) {
            Ok(next) => next,
            Err(err) => {
                error!("book removal: {}", err);
                self
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeleteState::Done | DeleteState::Orphaned | DeleteState::Failed)
    }
}

fn illegal_transition(state: String, event: String) -> LibraryError {
    LibraryError::runtime(format!("illegal transition from {} on {}", state, event).as_str(), None)
}
