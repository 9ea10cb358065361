// Core request primitives shared by the HTTP layer and the database
pub mod filters;
pub mod pagination;

pub use filters::{
    parse_compact_number, parse_follower_range, validate_page_id, FollowerRange, PageFilter,
};
pub use pagination::{parse_flag, parse_int_param, Pagination, PaginationMeta};
