pub mod blog_list;
pub mod blog_post;
