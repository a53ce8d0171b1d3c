pub(crate) mod langs;
pub(crate) mod output;
pub(crate) mod stats;
