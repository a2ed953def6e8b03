//! The model layer.
//!
//! Models are owned state machines: views observe their notifiers and read
//! their state, never the other way around. The top-level entry point is
//! [`OverviewPageModel`], which composes the rest.

pub mod filter;
mod overview;
mod pagination;
pub(crate) mod selection;

pub use filter::{
    ComparisonOperator, FilterModel, FilteringModel, NumericComparisonFilterModel,
    NumericFilterOptions, RawTextFilterModel, SelectionFilterModel, TimeRangeFilterModel,
    TokenListFilterModel,
};
pub use overview::{OverviewPageModel, OverviewPageModelBuilder, ProcessItems};
pub use pagination::{
    PaginationModel, DEFAULT_ITEMS_PER_PAGE, INFINITE_SCROLL_CHUNK_SIZE,
};
pub use selection::{AvailableOptions, SelectionConfig, SelectionModel, SelectionOption};
