pub mod map;
pub mod output;
pub mod panels;
