pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_sqlite;
    pub mod service;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_sqlite;
    pub mod service;
}
