pub mod cli;
pub mod edit;
pub mod index;
pub mod list;
pub mod run;
pub mod select;
