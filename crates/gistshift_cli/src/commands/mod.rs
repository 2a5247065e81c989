pub(crate) mod limits;
pub(crate) mod list;
pub(crate) mod meta;
pub(crate) mod run;
pub(crate) mod shared;
