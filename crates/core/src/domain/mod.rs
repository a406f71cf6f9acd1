pub mod concept;
pub mod request;
