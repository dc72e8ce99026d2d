//! State module for tracking progress within a crawl pass
//!
//! # Components
//!
//! - `SeenState`: which posts and full threads have already been fetched in
//!   the current site pass, used to skip redundant remote calls

mod seen_state;

pub use seen_state::SeenState;
