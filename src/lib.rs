pub mod controller;
pub mod history;
pub mod models;
pub mod placeholder;
pub mod policy;
pub mod provider;
pub mod routes;
pub mod service;
pub mod storage;
