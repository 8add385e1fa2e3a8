pub mod dto;
pub mod habit_service;
