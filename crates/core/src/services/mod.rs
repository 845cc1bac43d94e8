//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod cache;
pub mod contact;
pub mod dashboard;
pub mod forms;
pub mod i18n;
pub mod listing;
pub mod post;
pub mod project;
pub mod tag;
pub mod upload;

pub use auth::{AuthService, LoginInput, LoginResponse, SessionInfo};
pub use cache::RouteCache;
pub use contact::{ContactInput, ContactResponse, ContactService};
pub use dashboard::{DashboardService, DashboardStats};
pub use i18n::Lang;
pub use listing::{ListQuery, SortOrder};
pub use post::{PostDetail, PostEdit, PostForm, PostService, PostSummary};
pub use project::{ProjectDetail, ProjectEdit, ProjectForm, ProjectService, ProjectSummary};
pub use tag::{TagForm, TagResponse, TagService};
pub use upload::{UploadResponse, UploadService};
