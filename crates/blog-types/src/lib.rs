#![allow(non_snake_case)]

pub mod post;
pub mod session;
pub mod user;

pub use post::*;
pub use session::*;
pub use user::*;
