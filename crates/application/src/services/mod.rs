//! Application services

pub mod video_service;
