pub mod catalog;
pub mod dto;
pub mod editor;
pub mod error;
pub mod keywords;
pub mod normalizer;
pub mod runtime;
pub mod storage;
pub mod validator;
