pub mod current_user;
pub mod resource_id;

pub use current_user::CurrentUser;
pub use resource_id::ResourceId;
