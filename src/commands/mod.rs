pub mod crop;
pub mod info;
pub mod merge;
pub mod organize;
pub mod split;
