#![deny(unsafe_code)]

/// Desktop chat shell built with GPUI and gpui-component.
pub mod app;
/// Chat views and the store bridge they share.
pub mod chat;
/// Routes and the window/navigation helper.
pub mod navigation;
/// Settings persistence.
pub mod settings;
