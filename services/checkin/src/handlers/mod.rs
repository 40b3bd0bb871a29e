pub mod health;
pub mod issue;
pub mod landing;
pub mod verify;
