pub mod albaranes;
pub mod clients;
pub mod companies;
pub mod projects;
pub mod users;
