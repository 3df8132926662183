pub mod core {
    pub mod command;
    pub mod controller;
    pub mod domain;
    pub mod library;
    pub mod repository;
    pub mod security;
}

pub mod utils {
    pub mod date;
    pub mod ddb;
}

pub mod books;
pub mod catalog;
pub mod gateway;
