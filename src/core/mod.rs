// Core modules: the dispatch seam and error modeling.
pub mod dispatch;
pub mod error;
