pub mod config;
pub mod notice;
pub mod output;
pub mod persistence;
pub mod profile;
pub mod scoring;
pub mod timeline;
pub mod wizard;
