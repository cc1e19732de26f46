//! Result aggregation: program grouping, pagination and filtered views.

pub mod group;
pub mod page;
pub mod view;

pub use group::{GroupedProgram, group_by_program, select_offerings, sort_for_table};
pub use page::{Page, paginate, total_pages};
pub use view::{InstitutionFilter, PagedView};
