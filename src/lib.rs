pub mod core {
    pub mod command;
    pub mod controller;
    pub mod domain;
    pub mod library;
}

pub mod books;
pub mod catalog;
pub mod console;
pub mod gateway;

pub mod utils {
    pub mod trace;
}
