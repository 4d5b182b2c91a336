pub(crate) mod check;
pub(crate) mod query;
pub(crate) mod run;
