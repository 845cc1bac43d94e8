//! Database entities.

pub mod admin_session;
pub mod admin_user;
pub mod contact;
pub mod post;
pub mod post_tag;
pub mod project;
pub mod project_image;
pub mod project_tag;
pub mod status;
pub mod tag;

pub use admin_session::Entity as AdminSession;
pub use admin_user::Entity as AdminUser;
pub use contact::Entity as Contact;
pub use post::Entity as Post;
pub use post_tag::Entity as PostTag;
pub use project::Entity as Project;
pub use project_image::Entity as ProjectImage;
pub use project_tag::Entity as ProjectTag;
pub use status::ContentStatus;
pub use tag::Entity as Tag;
