// External search collaborator.

pub mod service;
