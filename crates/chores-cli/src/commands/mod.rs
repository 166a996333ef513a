pub mod add;
pub mod category;
pub mod delete;
pub mod done;
pub mod edit;
pub mod extend;
pub mod group;
pub mod list;
pub mod show;
pub mod user;
