/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, verify)
/// - `users`: Self-scoped account management
/// - `projects`: Project CRUD
/// - `contributors`: Project membership management
/// - `issues`: Issue CRUD nested under a project
/// - `comments`: Comment CRUD nested under an issue

pub mod auth;
pub mod comments;
pub mod contributors;
pub mod health;
pub mod issues;
pub mod projects;
pub mod users;
