pub mod adresse_api_model;
pub mod batch;
pub mod mobilites_api_model;
pub mod region;
pub mod stop;
